//! PbdWorld - in-crate position based dynamics world
//!
//! Frame time is fed into an accumulator and consumed in fixed internal
//! steps, at most `max_sub_steps` per call. Time beyond that is dropped so a
//! long stall cannot trigger a catch-up spiral.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::core::Vec3;
use crate::systems::rigid_body::StaticBody;
use crate::systems::soft_body::{solver, SoftBody};

use super::arena::Arena;
use super::{
    DynamicsBackend, EngineError, LiveBodies, RigidBodyDesc, RigidHandle, SoftBodyInfo, SoftCoefficients,
    SoftHandle, SoftPatchDesc, WorldConfig,
};

pub struct PbdWorld {
    config: WorldConfig,
    rigid: Arena<StaticBody>,
    soft: Arena<SoftBody>,
    /// Unconsumed frame time, in seconds
    time_accumulator: f64,
}

impl PbdWorld {
    fn soft(&self, handle: SoftHandle) -> Result<&SoftBody, EngineError> {
        self.soft.get(handle.0).ok_or(EngineError::StaleHandle(handle.0))
    }

    fn soft_mut(&mut self, handle: SoftHandle) -> Result<&mut SoftBody, EngineError> {
        self.soft.get_mut(handle.0).ok_or(EngineError::StaleHandle(handle.0))
    }

    fn internal_step(&mut self, dt: f32) {
        let statics: Vec<&StaticBody> = self.rigid.values().collect();
        for body in self.soft.values_mut() {
            solver::step(body, &statics, self.config.gravity, dt, self.config.solver_iterations);
        }
    }
}

impl DynamicsBackend for PbdWorld {
    fn load(config: &WorldConfig) -> Result<Self, EngineError> {
        if !(config.fixed_time_step.is_finite() && config.fixed_time_step > 0.0) {
            return Err(EngineError::LoadFailed(format!(
                "fixed time step must be > 0, got {}",
                config.fixed_time_step
            )));
        }
        if config.solver_iterations == 0 || !config.gravity.is_finite() {
            return Err(EngineError::LoadFailed("invalid solver settings".to_string()));
        }
        Ok(Self {
            config: *config,
            rigid: Arena::new(),
            soft: Arena::new(),
            time_accumulator: 0.0,
        })
    }

    fn add_rigid_body(&mut self, desc: &RigidBodyDesc) -> Result<RigidHandle, EngineError> {
        let body = StaticBody::new(desc)?;
        Ok(RigidHandle(self.rigid.insert(body)))
    }

    fn remove_rigid_body(&mut self, handle: RigidHandle) -> Result<(), EngineError> {
        self.rigid.remove(handle.0).map(|_| ()).ok_or(EngineError::StaleHandle(handle.0))
    }

    fn add_soft_patch(&mut self, desc: &SoftPatchDesc) -> Result<SoftHandle, EngineError> {
        let body = SoftBody::from_patch(desc)?;
        Ok(SoftHandle(self.soft.insert(body)))
    }

    fn remove_soft_body(&mut self, handle: SoftHandle) -> Result<(), EngineError> {
        self.soft.remove(handle.0).map(|_| ()).ok_or(EngineError::StaleHandle(handle.0))
    }

    fn soft_body_info(&self, handle: SoftHandle) -> Result<SoftBodyInfo, EngineError> {
        Ok(self.soft(handle)?.info())
    }

    fn soft_coefficients(&self, handle: SoftHandle) -> Result<SoftCoefficients, EngineError> {
        Ok(self.soft(handle)?.coefficients)
    }

    fn set_soft_coefficients(&mut self, handle: SoftHandle, coefficients: &SoftCoefficients) -> Result<(), EngineError> {
        self.soft_mut(handle)?.set_coefficients(coefficients)
    }

    fn node_position(&self, handle: SoftHandle, node: usize) -> Result<Vec3, EngineError> {
        let body = self.soft(handle)?;
        body.check_node(node)?;
        Ok(body.positions[node])
    }

    fn node_velocity(&self, handle: SoftHandle, node: usize) -> Result<Vec3, EngineError> {
        let body = self.soft(handle)?;
        body.check_node(node)?;
        Ok(body.velocities[node])
    }

    fn set_node_state(&mut self, handle: SoftHandle, node: usize, position: Vec3, velocity: Vec3) -> Result<(), EngineError> {
        let body = self.soft_mut(handle)?;
        body.check_node(node)?;
        body.positions[node] = position;
        body.velocities[node] = velocity;
        Ok(())
    }

    fn node_inverse_mass(&self, handle: SoftHandle, node: usize) -> Result<f32, EngineError> {
        let body = self.soft(handle)?;
        body.check_node(node)?;
        Ok(body.inverse_mass[node])
    }

    fn set_node_inverse_mass(&mut self, handle: SoftHandle, node: usize, inverse_mass: f32) -> Result<(), EngineError> {
        if !(inverse_mass.is_finite() && inverse_mass >= 0.0) {
            return Err(EngineError::InvalidDescriptor(format!("inverse mass must be >= 0, got {}", inverse_mass)));
        }
        let body = self.soft_mut(handle)?;
        body.check_node(node)?;
        body.inverse_mass[node] = inverse_mass;
        Ok(())
    }

    fn read_node_positions(&self, handle: SoftHandle, out: &mut [f32]) -> Result<(), EngineError> {
        let body = self.soft(handle)?;
        if out.len() != body.node_count() * 3 {
            return Err(EngineError::InvalidDescriptor(format!(
                "position buffer holds {} floats, cloth needs {}",
                out.len(),
                body.node_count() * 3
            )));
        }

        #[cfg(feature = "parallel")]
        out.par_chunks_mut(3).zip(body.positions.par_iter()).for_each(|(dst, p)| {
            dst.copy_from_slice(&[p.x, p.y, p.z]);
        });

        #[cfg(not(feature = "parallel"))]
        out.chunks_mut(3).zip(body.positions.iter()).for_each(|(dst, p)| {
            dst.copy_from_slice(&[p.x, p.y, p.z]);
        });

        Ok(())
    }

    fn step_simulation(&mut self, dt: f32, max_sub_steps: u32) -> u32 {
        if !(dt.is_finite() && dt > 0.0) {
            return 0;
        }
        let fixed = f64::from(self.config.fixed_time_step);
        self.time_accumulator += f64::from(dt);

        let due = (self.time_accumulator / fixed).floor();
        let steps = if due >= f64::from(max_sub_steps) {
            // Anything past the cap is dropped; only the partial step carries over.
            self.time_accumulator %= fixed;
            max_sub_steps
        } else {
            let due = due as u32;
            self.time_accumulator -= f64::from(due) * fixed;
            due
        };

        for _ in 0..steps {
            self.internal_step(self.config.fixed_time_step);
        }
        steps
    }

    fn live_bodies(&self) -> LiveBodies {
        LiveBodies {
            rigid: self.rigid.len(),
            soft: self.soft.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::dynamics::{ClusterRequest, ColliderShape};

    fn world() -> PbdWorld {
        PbdWorld::load(&WorldConfig::default()).unwrap()
    }

    fn patch() -> SoftPatchDesc {
        SoftPatchDesc {
            corners: [
                Vec3::new(-1.0, 3.0, -1.0),
                Vec3::new(1.0, 3.0, -1.0),
                Vec3::new(-1.0, 3.0, 1.0),
                Vec3::new(1.0, 3.0, 1.0),
            ],
            res_x: 4,
            res_y: 4,
            diagonal_links: true,
            bending: None,
            clusters: ClusterRequest::Automatic,
            coefficients: SoftCoefficients {
                linear_stiffness: 0.9,
                area_stiffness: 0.9,
                dynamic_friction: 0.2,
                damping: 0.0,
                total_mass: 0.5,
            },
            margin: 0.1,
            self_collision: true,
        }
    }

    #[test]
    fn zero_dt_takes_no_internal_step() {
        let mut w = world();
        let h = w.add_soft_patch(&patch()).unwrap();
        let before = w.node_position(h, 5).unwrap();
        assert_eq!(w.step_simulation(0.0, 10), 0);
        assert_eq!(w.node_position(h, 5).unwrap(), before);
    }

    #[test]
    fn one_frame_is_one_internal_step() {
        let mut w = world();
        assert_eq!(w.step_simulation(1.0 / 60.0, 10), 1);
        // Half frames accumulate.
        assert_eq!(w.step_simulation(1.0 / 120.0, 10), 0);
        assert_eq!(w.step_simulation(1.0 / 120.0, 10), 1);
    }

    #[test]
    fn long_stall_is_capped_at_max_sub_steps() {
        let mut w = world();
        assert_eq!(w.step_simulation(1.0, 10), 10);
        // Excess time was dropped, not carried over.
        assert_eq!(w.step_simulation(1.0 / 60.0, 10), 1);
        // Stalls far beyond u32 steps are clamped the same way.
        assert_eq!(w.step_simulation(1.0e9, 10), 10);
        assert_eq!(w.step_simulation(1.0 / 60.0, 10), 1);
        assert_eq!(w.step_simulation(f32::MAX, 3), 3);
        assert_eq!(w.step_simulation(1.0 / 60.0, 10), 1);
    }

    #[test]
    fn removed_handles_go_stale() {
        let mut w = world();
        let rigid = w
            .add_rigid_body(&RigidBodyDesc {
                shape: ColliderShape::Sphere { radius: 1.0 },
                position: Vec3::zero(),
                margin: 0.1,
                friction: 0.5,
                mass: 0.0,
            })
            .unwrap();
        let soft = w.add_soft_patch(&patch()).unwrap();
        assert_eq!(w.live_bodies(), LiveBodies { rigid: 1, soft: 1 });

        w.remove_rigid_body(rigid).unwrap();
        w.remove_soft_body(soft).unwrap();
        assert_eq!(w.live_bodies().total(), 0);
        assert_eq!(w.remove_rigid_body(rigid), Err(EngineError::StaleHandle(rigid.0)));
        assert!(matches!(w.node_position(soft, 0), Err(EngineError::StaleHandle(_))));
    }

    #[test]
    fn read_positions_packs_xyz() {
        let mut w = world();
        let h = w.add_soft_patch(&patch()).unwrap();
        let mut out = vec![0.0f32; 48];
        w.read_node_positions(h, &mut out).unwrap();
        assert_eq!(&out[0..3], &[-1.0, 3.0, -1.0]);
        assert_eq!(&out[45..48], &[1.0, 3.0, 1.0]);
        assert!(w.read_node_positions(h, &mut out[..6]).is_err());
    }

    #[test]
    fn node_out_of_range_is_reported() {
        let mut w = world();
        let h = w.add_soft_patch(&patch()).unwrap();
        assert_eq!(
            w.set_node_inverse_mass(h, 16, 0.0),
            Err(EngineError::NodeOutOfRange { index: 16, node_count: 16 })
        );
    }
}
