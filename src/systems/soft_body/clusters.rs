//! Node clusters and cluster-based self collision
//!
//! Clusters partition the nodes by k-means over the rest positions. Each step
//! the cluster bounds are refreshed from predicted positions and only
//! overlapping cluster pairs are tested node against node.

use crate::core::Vec3;
use crate::systems::dynamics::ClusterRequest;

use super::body::SoftBody;

/// Target node count per cluster when the count is automatic.
pub const AUTO_CLUSTER_SIZE: usize = 64;

const KMEANS_ITERATIONS: usize = 8;

/// Nodes this close on the grid (Chebyshev distance) never self collide.
/// They are held apart by links already.
const GRID_EXCLUSION: usize = 2;

#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    pub nodes: Vec<u32>,
    pub aabb_min: Vec3,
    pub aabb_max: Vec3,
}

/// Cluster count the engine will build for `node_count` nodes.
pub fn cluster_count(node_count: usize, request: ClusterRequest) -> usize {
    let k = match request {
        ClusterRequest::Automatic => node_count.div_ceil(AUTO_CLUSTER_SIZE),
        ClusterRequest::Fixed(k) => k,
    };
    k.max(1)
}

/// Deterministic k-means. Seeds are spread evenly through the node list;
/// a cluster that ends up empty keeps its slot.
pub fn generate(positions: &[Vec3], request: ClusterRequest) -> Vec<Cluster> {
    let k = cluster_count(positions.len(), request);
    let n = positions.len();
    if n == 0 {
        return Vec::new();
    }

    let mut centers: Vec<Vec3> = (0..k).map(|c| positions[(c * n / k).min(n - 1)]).collect();
    let mut assignment = vec![0usize; n];

    for _ in 0..KMEANS_ITERATIONS {
        for (i, p) in positions.iter().enumerate() {
            assignment[i] = nearest(&centers, *p);
        }

        let mut sums = vec![Vec3::zero(); k];
        let mut counts = vec![0usize; k];
        for (i, p) in positions.iter().enumerate() {
            sums[assignment[i]] += *p;
            counts[assignment[i]] += 1;
        }
        for c in 0..k {
            if counts[c] > 0 {
                centers[c] = sums[c] * (1.0 / counts[c] as f32);
            }
        }
    }

    let mut clusters: Vec<Cluster> = (0..k)
        .map(|_| Cluster { nodes: Vec::new(), aabb_min: Vec3::zero(), aabb_max: Vec3::zero() })
        .collect();
    for (i, &c) in assignment.iter().enumerate() {
        clusters[c].nodes.push(i as u32);
    }
    for cluster in clusters.iter_mut() {
        refresh_bounds(cluster, positions);
    }
    clusters
}

fn nearest(centers: &[Vec3], p: Vec3) -> usize {
    let mut best = 0;
    let mut best_d = f32::INFINITY;
    for (c, center) in centers.iter().enumerate() {
        let d = (p - *center).length_squared();
        if d < best_d {
            best_d = d;
            best = c;
        }
    }
    best
}

fn refresh_bounds(cluster: &mut Cluster, positions: &[Vec3]) {
    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);
    for &i in &cluster.nodes {
        let p = *fast!(positions, [i as usize]);
        min = min.min(p);
        max = max.max(p);
    }
    cluster.aabb_min = min;
    cluster.aabb_max = max;
}

#[inline]
fn overlaps(a: &Cluster, b: &Cluster, pad: f32) -> bool {
    a.aabb_min.x <= b.aabb_max.x + pad
        && b.aabb_min.x <= a.aabb_max.x + pad
        && a.aabb_min.y <= b.aabb_max.y + pad
        && b.aabb_min.y <= a.aabb_max.y + pad
        && a.aabb_min.z <= b.aabb_max.z + pad
        && b.aabb_min.z <= a.aabb_max.z + pad
}

/// Separate non-neighbouring nodes closer than two node margins.
///
/// Works on the solver's predicted positions. Returns the number of node
/// pairs pushed apart.
pub(super) fn solve_self_collision(body: &mut SoftBody) -> usize {
    let min_dist = 2.0 * body.margin;
    if min_dist <= 0.0 {
        return 0;
    }
    let min_dist_sq = min_dist * min_dist;

    let mut clusters = std::mem::take(&mut body.clusters);
    for cluster in clusters.iter_mut() {
        refresh_bounds(cluster, &body.predicted);
    }

    let mut resolved = 0;
    for ci in 0..clusters.len() {
        if clusters[ci].nodes.is_empty() {
            continue;
        }
        for cj in ci..clusters.len() {
            if clusters[cj].nodes.is_empty() || !overlaps(&clusters[ci], &clusters[cj], min_dist) {
                continue;
            }
            for (ai, &a) in clusters[ci].nodes.iter().enumerate() {
                let others = if ci == cj { &clusters[cj].nodes[ai + 1..] } else { &clusters[cj].nodes[..] };
                for &b in others {
                    if separate(body, a as usize, b as usize, min_dist, min_dist_sq) {
                        resolved += 1;
                    }
                }
            }
        }
    }

    body.clusters = clusters;
    resolved
}

#[inline]
fn separate(body: &mut SoftBody, a: usize, b: usize, min_dist: f32, min_dist_sq: f32) -> bool {
    let (ax, ay) = body.grid_coords(a);
    let (bx, by) = body.grid_coords(b);
    if ax.abs_diff(bx) <= GRID_EXCLUSION && ay.abs_diff(by) <= GRID_EXCLUSION {
        return false;
    }

    let wa = *fast!(body.inverse_mass, [a]);
    let wb = *fast!(body.inverse_mass, [b]);
    let w = wa + wb;
    if w <= 0.0 {
        return false;
    }

    let delta = *fast!(body.predicted, [b]) - *fast!(body.predicted, [a]);
    let dist_sq = delta.length_squared();
    if dist_sq >= min_dist_sq || dist_sq < 1e-12 {
        return false;
    }

    let dist = dist_sq.sqrt();
    let correction = delta * ((min_dist - dist) / (dist * w));
    body.predicted[a] -= correction * wa;
    body.predicted[b] += correction * wb;
    true
}
