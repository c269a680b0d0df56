//! Strain shading: quad geometry to grey lightness, and the surface it is painted on.
//!
//! The geometry half is pure and works on plain corner positions; only
//! [`DistortionRenderer::render`] touches a [`DrawSurface`].

use alloc::rc::Rc;
use alloc::vec::Vec as AllocVec;
use core::cell::RefCell;
use core::fmt;

use crate::float::Float;
use crate::mesh::ClothMesh;
use crate::vec::Vec2;
use crate::world::PhysicsWorld;

/// Area of triangle `abc` by the shoelace formula.
pub fn triangle_area<F: Float>(a: Vec2<F>, b: Vec2<F>, c: Vec2<F>) -> F {
    F::half() * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y)).abs()
}

/// Map `current area / rest area` to an HSL lightness percentage.
///
/// Compressed cells (ratio below 0.9) brighten quadratically up to 90;
/// stretched cells darken linearly down to 0. An undeformed cell is 5.
pub fn strain_lightness<F: Float>(ratio: F) -> F {
    let five = F::from_f64(5.0);
    let knee = F::from_f64(0.9);
    if ratio < knee {
        let diff = (knee - ratio) * F::from_f64(10.0);
        (five + diff * diff * five).min(F::from_f64(90.0))
    } else {
        (five - (ratio - F::one()) * F::from_f64(20.0)).max(F::zero())
    }
}

/// One grid cell, corners in top-left, top-right, bottom-right, bottom-left order.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Quad<F: Float> {
    pub row: usize,
    pub col: usize,
    pub corners: [Vec2<F>; 4],
}

impl<F: Float> Quad<F> {
    /// Sum of triangles (TL, TR, BR) and (TL, BR, BL).
    pub fn area(&self) -> F {
        let [tl, tr, br, bl] = self.corners;
        triangle_area(tl, tr, br) + triangle_area(tl, br, bl)
    }

    pub fn strain_ratio(&self, rest_area: F) -> F {
        self.area() / rest_area
    }

    pub fn shade(&self, rest_area: F) -> Shade<F> {
        Shade::grey(strain_lightness(self.strain_ratio(rest_area)))
    }
}

/// Grey at `lightness` percent, zero saturation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Shade<F: Float> {
    pub lightness: F,
}

impl<F: Float> Shade<F> {
    pub fn grey(lightness: F) -> Self {
        Shade { lightness }
    }
}

impl<F: Float> fmt::Display for Shade<F> {
    /// CSS colour, e.g. `hsl(0, 0%, 5%)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsl(0, 0%, {}%)", self.lightness.to_f64())
    }
}

/// A 2D target with polygon primitives.
pub trait DrawSurface<F: Float> {
    /// Current drawable size in px. A zero axis means nothing can be laid out yet.
    fn size(&self) -> (F, F);

    fn clear(&mut self);

    fn fill_polygon(&mut self, points: &[Vec2<F>], shade: Shade<F>);

    fn stroke_polygon(&mut self, points: &[Vec2<F>], shade: Shade<F>, line_width: F);
}

/// Walks a mesh in quads and paints each by its strain.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DistortionRenderer<F: Float> {
    pub line_width: F,
}

impl<F: Float> DistortionRenderer<F> {
    pub fn new(line_width: F) -> Self {
        DistortionRenderer { line_width }
    }

    /// Quads in row-major order from current positions, rest positions where missing.
    pub fn quads<'a, W: PhysicsWorld<Scalar = F>>(
        &self,
        mesh: &'a ClothMesh<F>,
        world: &'a W,
    ) -> impl Iterator<Item = Quad<F>> + 'a {
        let cols = mesh.cols();
        (0..mesh.rows() - 1).flat_map(move |row| {
            (0..cols - 1).map(move |col| Quad {
                row,
                col,
                corners: [
                    mesh.position_at(world, row, col),
                    mesh.position_at(world, row, col + 1),
                    mesh.position_at(world, row + 1, col + 1),
                    mesh.position_at(world, row + 1, col),
                ],
            })
        })
    }

    /// Every quad with its shade, without drawing anything.
    pub fn shade_all<W: PhysicsWorld<Scalar = F>>(
        &self,
        mesh: &ClothMesh<F>,
        world: &W,
    ) -> AllocVec<(Quad<F>, Shade<F>)> {
        let rest_area = mesh.rest_area();
        self.quads(mesh, world).map(|q| (q, q.shade(rest_area))).collect()
    }

    /// Clear the surface and paint the mesh. Reads the world, never mutates it.
    pub fn render<W, S>(&self, mesh: &ClothMesh<F>, world: &W, surface: &mut S)
    where
        W: PhysicsWorld<Scalar = F>,
        S: DrawSurface<F> + ?Sized,
    {
        surface.clear();
        let rest_area = mesh.rest_area();
        for quad in self.quads(mesh, world) {
            let shade = quad.shade(rest_area);
            surface.fill_polygon(&quad.corners, shade);
            surface.stroke_polygon(&quad.corners, shade, self.line_width);
        }
    }
}

impl<F: Float> Default for DistortionRenderer<F> {
    fn default() -> Self {
        Self::new(F::one())
    }
}

/// A drawing call captured by [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand<F: Float> {
    Clear,
    Fill { points: AllocVec<Vec2<F>>, shade: Shade<F> },
    Stroke { points: AllocVec<Vec2<F>>, shade: Shade<F>, line_width: F },
}

#[derive(Debug)]
struct Recording<F: Float> {
    size: (F, F),
    commands: AllocVec<DrawCommand<F>>,
    clears: usize,
}

/// Headless surface that records every call.
///
/// Clones share one recording, so a host can hand a clone to the overlay and
/// keep another to inspect what was drawn.
#[derive(Clone, Debug)]
pub struct RecordingSurface<F: Float> {
    inner: Rc<RefCell<Recording<F>>>,
}

impl<F: Float> RecordingSurface<F> {
    pub fn new(width: F, height: F) -> Self {
        RecordingSurface {
            inner: Rc::new(RefCell::new(Recording {
                size: (width, height),
                commands: AllocVec::new(),
                clears: 0,
            })),
        }
    }

    pub fn resize(&self, width: F, height: F) {
        self.inner.borrow_mut().size = (width, height);
    }

    /// Number of `clear` calls, i.e. frames started.
    pub fn frames(&self) -> usize {
        self.inner.borrow().clears
    }

    /// Commands issued since the most recent `clear`.
    pub fn last_frame(&self) -> AllocVec<DrawCommand<F>> {
        let rec = self.inner.borrow();
        let start = rec
            .commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::Clear))
            .map_or(0, |i| i + 1);
        rec.commands[start..].to_vec()
    }

    /// Shades of the fills in the most recent frame.
    pub fn last_frame_shades(&self) -> AllocVec<Shade<F>> {
        self.last_frame()
            .into_iter()
            .filter_map(|c| match c {
                DrawCommand::Fill { shade, .. } => Some(shade),
                _ => None,
            })
            .collect()
    }
}

impl<F: Float> DrawSurface<F> for RecordingSurface<F> {
    fn size(&self) -> (F, F) {
        self.inner.borrow().size
    }

    fn clear(&mut self) {
        let mut rec = self.inner.borrow_mut();
        rec.clears += 1;
        // Keep only the current frame.
        rec.commands.clear();
        rec.commands.push(DrawCommand::Clear);
    }

    fn fill_polygon(&mut self, points: &[Vec2<F>], shade: Shade<F>) {
        self.inner
            .borrow_mut()
            .commands
            .push(DrawCommand::Fill { points: points.to_vec(), shade });
    }

    fn stroke_polygon(&mut self, points: &[Vec2<F>], shade: Shade<F>, line_width: F) {
        self.inner
            .borrow_mut()
            .commands
            .push(DrawCommand::Stroke { points: points.to_vec(), shade, line_width });
    }
}
