use crate::math::{wrap_angle, Vec2};
use crate::objects::rigid_body::RigidBody;

/// Advances a body by `dt` with semi-implicit Euler.
///
/// Gravity (when the body follows it) is added to the accumulated force, the
/// velocity is updated first and the new velocity moves the body. Drag damps
/// both velocities. Static bodies are skipped. Accumulators are always cleared.
pub fn integrate(body: &mut RigidBody, gravity: Vec2, dt: f64) {
    if body.is_static() {
        body.clear_accumulators();
        return;
    }

    if body.follows_gravity {
        body.force += gravity * body.mass();
    }

    // --- Linear Motion --- //
    let linear_acceleration = body.force * body.inv_mass();
    body.velocity += linear_acceleration * dt;
    body.velocity *= damping(body.drag, dt);
    body.transform.position += body.velocity * dt;

    // --- Angular Motion --- //
    if body.fixed_rotation {
        body.angular_velocity = 0.0;
    } else {
        let angular_acceleration = body.torque * body.inv_inertia();
        body.angular_velocity += angular_acceleration * dt;
        body.angular_velocity *= damping(body.angular_drag, dt);
        body.transform.rotation = wrap_angle(body.transform.rotation + body.angular_velocity * dt);
    }

    body.clear_accumulators();
}

/// Fraction of velocity kept after `dt` seconds of drag.
fn damping(drag: f64, dt: f64) -> f64 {
    (1.0 - drag * dt).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    const EPSILON: f64 = 1e-9;

    const NO_GRAVITY: Vec2 = Vec2::ZERO;

    #[test]
    fn test_integrate_linear_motion_no_force() {
        let mut rb = RigidBody::new(1.0).with_velocity(Vec2::new(10.0, -5.0));
        integrate(&mut rb, NO_GRAVITY, 0.1);

        assert!((rb.position().x - 1.0).abs() < EPSILON);
        assert!((rb.position().y - -0.5).abs() < EPSILON);
        assert_eq!(rb.velocity, Vec2::new(10.0, -5.0));
        assert_eq!(rb.force, Vec2::ZERO);
    }

    #[test]
    fn test_integrate_linear_motion_constant_force() {
        let mut rb = RigidBody::new(2.0);
        rb.apply_force(Vec2::new(10.0, 0.0));
        integrate(&mut rb, NO_GRAVITY, 0.1);

        // a = 5, v = 0.5, p = v * dt (semi-implicit) = 0.05
        assert!((rb.velocity.x - 0.5).abs() < EPSILON);
        assert!((rb.position().x - 0.05).abs() < EPSILON);
    }

    #[test]
    fn test_integrate_gravity_scales_with_mass() {
        let gravity = Vec2::new(0.0, -9.8);
        let mut light = RigidBody::new(1.0);
        let mut heavy = RigidBody::new(50.0);
        integrate(&mut light, gravity, 0.5);
        integrate(&mut heavy, gravity, 0.5);
        assert!((light.velocity.y - -4.9).abs() < EPSILON);
        assert!((heavy.velocity.y - light.velocity.y).abs() < EPSILON);
        assert_eq!(heavy.force, Vec2::ZERO);
    }

    #[test]
    fn test_integrate_ignores_gravity_when_disabled() {
        let mut rb = RigidBody::new(1.0).with_gravity(false);
        integrate(&mut rb, Vec2::new(0.0, -9.8), 1.0);
        assert_eq!(rb.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_integrate_static_body_never_moves() {
        let mut rb = RigidBody::new_static().with_position(Vec2::new(1.0, 1.0));
        rb.follows_gravity = true;
        rb.apply_force(Vec2::new(100.0, 0.0));
        integrate(&mut rb, Vec2::new(0.0, -9.8), 1.0);
        assert_eq!(rb.position(), Vec2::new(1.0, 1.0));
        assert_eq!(rb.velocity, Vec2::ZERO);
        assert_eq!(rb.force, Vec2::ZERO);
    }

    #[test]
    fn test_integrate_angular_motion_and_wrap() {
        let mut rb = RigidBody::new(1.0).with_inertia(2.0).with_rotation(PI - 0.05);
        rb.apply_torque(4.0);
        integrate(&mut rb, NO_GRAVITY, 0.1);
        // alpha = 2, w = 0.2, theta = PI - 0.05 + 0.02 stays below PI
        assert!((rb.angular_velocity - 0.2).abs() < EPSILON);
        assert!((rb.rotation() - (PI - 0.03)).abs() < EPSILON);

        rb.angular_velocity = 1.0;
        integrate(&mut rb, NO_GRAVITY, 0.1);
        assert!((rb.rotation() - (-PI + 0.07)).abs() < EPSILON);
    }

    #[test]
    fn test_integrate_fixed_rotation() {
        let mut rb = RigidBody::new(1.0).with_inertia(1.0).with_fixed_rotation();
        rb.apply_torque(10.0);
        integrate(&mut rb, NO_GRAVITY, 0.1);
        assert_eq!(rb.angular_velocity, 0.0);
        assert_eq!(rb.rotation(), 0.0);
    }

    #[test]
    fn test_integrate_drag_damps_velocity() {
        let mut rb = RigidBody::new(1.0).with_velocity(Vec2::new(10.0, 0.0)).with_drag(1.0, 0.0);
        integrate(&mut rb, NO_GRAVITY, 0.1);
        assert!((rb.velocity.x - 9.0).abs() < EPSILON);

        let mut stopped = RigidBody::new(1.0).with_velocity(Vec2::new(10.0, 0.0)).with_drag(100.0, 0.0);
        integrate(&mut stopped, NO_GRAVITY, 0.1);
        assert_eq!(stopped.velocity, Vec2::ZERO);
    }
}
