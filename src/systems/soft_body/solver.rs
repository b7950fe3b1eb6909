//! Position-based cloth solver
//!
//! One internal step:
//! 1. Predict: apply gravity and damping to velocities, move predicted
//!    positions. Pinned nodes (inverse mass 0) stay put.
//! 2. Iterate: project every link, then push nodes out of static bodies.
//! 3. Self collision between clusters (once per step).
//! 4. Final contact pass with friction on the tangential motion.
//! 5. Velocities from the position change, commit.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::core::Vec3;
use crate::systems::rigid_body::StaticBody;

use super::body::{LinkKind, SoftBody};
use super::clusters;

/// Per-iteration stiffness that compounds to `k` over `iterations` passes.
#[inline]
pub fn iteration_stiffness(k: f32, iterations: u32) -> f32 {
    if k >= 1.0 {
        return 1.0;
    }
    1.0 - (1.0 - k).powf(1.0 / iterations.max(1) as f32)
}

pub fn step(body: &mut SoftBody, statics: &[&StaticBody], gravity: Vec3, dt: f32, iterations: u32) {
    if body.node_count() == 0 || dt <= 0.0 {
        return;
    }

    predict(body, gravity, dt);

    let k_structural = iteration_stiffness(body.coefficients.linear_stiffness, iterations);
    let k_shear = iteration_stiffness(body.coefficients.area_stiffness, iterations);
    let k_bending = iteration_stiffness(body.bending_stiffness, iterations);

    for _ in 0..iterations {
        solve_links(body, k_structural, k_shear, k_bending);
        push_out_of_statics(body, statics);
    }

    if body.self_collision {
        clusters::solve_self_collision(body);
    }

    resolve_contacts(body, statics);
    commit(body, dt);
}

fn predict(body: &mut SoftBody, gravity: Vec3, dt: f32) {
    let keep = 1.0 - body.coefficients.damping;
    let integrate = |p: &mut Vec3, v: &mut Vec3, x: &Vec3, w: &f32| {
        if *w == 0.0 {
            *p = *x;
            return;
        }
        *v = (*v + gravity * dt) * keep;
        *p = *x + *v * dt;
    };

    #[cfg(feature = "parallel")]
    body.predicted
        .par_iter_mut()
        .zip(body.velocities.par_iter_mut())
        .zip(body.positions.par_iter())
        .zip(body.inverse_mass.par_iter())
        .for_each(|(((p, v), x), w)| integrate(p, v, x, w));

    #[cfg(not(feature = "parallel"))]
    body.predicted
        .iter_mut()
        .zip(body.velocities.iter_mut())
        .zip(body.positions.iter())
        .zip(body.inverse_mass.iter())
        .for_each(|(((p, v), x), w)| integrate(p, v, x, w));
}

/// Links share nodes, so this pass stays sequential (Gauss-Seidel).
fn solve_links(body: &mut SoftBody, k_structural: f32, k_shear: f32, k_bending: f32) {
    let SoftBody { links, predicted, inverse_mass, .. } = body;
    for link in links.iter() {
        let k = match link.kind {
            LinkKind::Structural => k_structural,
            LinkKind::Shear => k_shear,
            LinkKind::Bending => k_bending,
        };
        if k <= 0.0 {
            continue;
        }

        let (a, b) = (link.a as usize, link.b as usize);
        let wa = *fast!(inverse_mass, [a]);
        let wb = *fast!(inverse_mass, [b]);
        let w = wa + wb;
        if w <= 0.0 {
            continue;
        }

        let d = *fast!(predicted, [b]) - *fast!(predicted, [a]);
        let len = d.length();
        if len < 1e-9 {
            continue;
        }

        let c = (len - link.rest) / (len * w) * k;
        predicted[a] += d * (c * wa);
        predicted[b] -= d * (c * wb);
    }
}

fn push_out_of_statics(body: &mut SoftBody, statics: &[&StaticBody]) {
    let margin = body.margin;
    for (p, w) in body.predicted.iter_mut().zip(body.inverse_mass.iter()) {
        if *w == 0.0 {
            continue;
        }
        for s in statics {
            if let Some(contact) = s.project_out(*p, margin) {
                *p = contact.position;
            }
        }
    }
}

/// Nodes this close to a surface count as touching it for friction.
const CONTACT_SLOP: f32 = 1e-3;

/// Last projection of the step. Tangential motion of nodes touching a body
/// is scaled down by the combined friction of cloth and body.
fn resolve_contacts(body: &mut SoftBody, statics: &[&StaticBody]) {
    let margin = body.margin;
    let cloth_friction = body.coefficients.dynamic_friction;
    let SoftBody { predicted, positions, inverse_mass, .. } = body;

    for ((p, x), w) in predicted.iter_mut().zip(positions.iter()).zip(inverse_mass.iter()) {
        if *w == 0.0 {
            continue;
        }
        for s in statics {
            let Some(contact) = s.project_out(*p, margin + CONTACT_SLOP) else {
                continue;
            };
            if contact.depth > CONTACT_SLOP {
                *p = contact.position - contact.normal * CONTACT_SLOP;
            }
            apply_friction(p, *x, contact.normal, cloth_friction * s.friction);
        }
    }
}

#[inline]
fn apply_friction(p: &mut Vec3, start: Vec3, normal: Vec3, friction: f32) {
    if friction <= 0.0 {
        return;
    }
    let moved = *p - start;
    let tangential = moved - normal * moved.dot(normal);
    *p -= tangential * friction.min(1.0);
}

fn commit(body: &mut SoftBody, dt: f32) {
    let inv_dt = 1.0 / dt;
    let SoftBody { positions, velocities, predicted, inverse_mass, .. } = body;
    for i in 0..positions.len() {
        if *fast!(inverse_mass, [i]) == 0.0 {
            continue;
        }
        let p = *fast!(predicted, [i]);
        velocities[i] = (p - positions[i]) * inv_dt;
        positions[i] = p;
    }
}
