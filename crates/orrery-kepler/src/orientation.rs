//! Orientation of the orbital plane and of rotation axes.
//!
//! Angles are given in degrees. Rotations about +y are negated so that a
//! positive angle turns in the same direction as the anomaly advances
//! (from +x towards +z).

use glam::DQuat;

/// Rotation mapping plane-local vectors into the parent frame.
///
/// Composed as `Ry(−argument)·Rx(inclination)·Ry(−longitude)`. The order is
/// fixed: the argument of periapsis and inclination are applied together on
/// the left, the longitude of the ascending node on the right.
pub fn orbital_orientation(argument: f64, longitude: f64, inclination: f64) -> DQuat {
    DQuat::from_rotation_y(-argument.to_radians())
        * DQuat::from_rotation_x(inclination.to_radians())
        * DQuat::from_rotation_y(-longitude.to_radians())
}

/// Orientation of a spin axis from right ascension and declination.
pub fn axis_orientation(right_ascension: f64, declination: f64) -> DQuat {
    DQuat::from_rotation_y(-right_ascension.to_radians())
        * DQuat::from_rotation_x(declination.to_radians())
}

/// Rotation of a body spun by `angle` radians about the local up axis of `axis`.
pub fn spin(axis: DQuat, angle: f64) -> DQuat {
    axis * DQuat::from_rotation_y(-angle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn close(a: DVec3, b: DVec3) -> bool {
        (a - b).length() < 1e-12
    }

    #[test]
    fn test_zero_angles_is_identity() {
        let q = orbital_orientation(0.0, 0.0, 0.0);
        assert!(q.abs_diff_eq(DQuat::IDENTITY, 1e-15));
        assert!(axis_orientation(0.0, 0.0).abs_diff_eq(DQuat::IDENTITY, 1e-15));
    }

    #[test]
    fn test_argument_turns_periapsis_forward() {
        // Plane-local periapsis (+x) moves towards +z, the direction of motion.
        let q = orbital_orientation(90.0, 0.0, 0.0);
        assert!(close(q * DVec3::X, DVec3::Z));
    }

    #[test]
    fn test_flat_orbit_argument_and_longitude_add() {
        let a = orbital_orientation(30.0, 45.0, 0.0);
        let b = orbital_orientation(75.0, 0.0, 0.0);
        assert!(close(a * DVec3::X, b * DVec3::X));
        assert!(close(a * DVec3::Z, b * DVec3::Z));
    }

    #[test]
    fn test_inclination_tilts_plane_normal() {
        let q = orbital_orientation(0.0, 0.0, 90.0);
        let normal = q * DVec3::Y;
        assert!(normal.y.abs() < 1e-12);
        assert!((normal.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_composition_order_matters() {
        let q = orbital_orientation(30.0, 60.0, 20.0);
        let swapped = DQuat::from_rotation_y(-60f64.to_radians())
            * DQuat::from_rotation_x(20f64.to_radians())
            * DQuat::from_rotation_y(-30f64.to_radians());
        assert!(!close(q * DVec3::X, swapped * DVec3::X));
    }

    #[test]
    fn test_spin_keeps_axis_fixed() {
        let axis = axis_orientation(40.0, 23.5);
        let up = axis * DVec3::Y;
        for &angle in &[0.0, 0.5, 2.0, 6.0] {
            let r = spin(axis, angle);
            assert!(close(r * DVec3::Y, up));
        }
        assert!(spin(axis, 0.0).abs_diff_eq(axis, 1e-15));
    }
}
