use approx::assert_relative_eq;
use scene_ngin::{
    Transform, compose_model_matrix,
    cgmath::{Deg, Matrix4, Vector3, Vector4},
};

fn apply(matrix: Matrix4<f32>, point: [f32; 3]) -> Vector4<f32> {
    matrix * Vector4::new(point[0], point[1], point[2], 1.0)
}

#[test]
fn scale_then_yaw_then_translate() {
    let m = compose_model_matrix(
        Vector3::new(2.0, 1.0, 1.0),
        Vector3::new(0.0, 90.0, 0.0),
        Vector3::new(5.0, 0.0, 0.0),
    );
    let world = apply(m, [1.0, 0.0, 0.0]);

    assert_relative_eq!(world.x, 5.0, epsilon = 1e-5);
    assert_relative_eq!(world.y, 0.0, epsilon = 1e-5);
    assert_relative_eq!(world.z, -2.0, epsilon = 1e-5);
    assert_relative_eq!(world.w, 1.0);
}

#[test]
fn rotation_order_matters() {
    let m = compose_model_matrix(
        Vector3::new(1.0, 1.0, 1.0),
        Vector3::new(30.0, 45.0, 0.0),
        Vector3::new(0.0, 0.0, 0.0),
    );
    let swapped = Matrix4::from_angle_x(Deg(30.0)) * Matrix4::from_angle_y(Deg(45.0));

    let corner = [1.0, 1.0, 1.0];
    let ours = apply(m, corner);
    let theirs = apply(swapped, corner);
    let difference = (ours - theirs).truncate();
    assert!(
        difference.x.abs() + difference.y.abs() + difference.z.abs() > 1e-3,
        "{ours:?} vs {theirs:?}"
    );

    let expected = Matrix4::from_angle_y(Deg(45.0)) * Matrix4::from_angle_x(Deg(30.0));
    let reference = apply(expected, corner);
    assert_relative_eq!(ours.x, reference.x, epsilon = 1e-5);
    assert_relative_eq!(ours.y, reference.y, epsilon = 1e-5);
    assert_relative_eq!(ours.z, reference.z, epsilon = 1e-5);
}

#[test]
fn z_rotation_is_applied_last() {
    let m = compose_model_matrix(
        Vector3::new(1.0, 1.0, 1.0),
        Vector3::new(90.0, 0.0, 90.0),
        Vector3::new(0.0, 0.0, 0.0),
    );
    // X first sends +Y to +Z, Z then leaves it alone.
    let world = apply(m, [0.0, 1.0, 0.0]);
    assert_relative_eq!(world.x, 0.0, epsilon = 1e-5);
    assert_relative_eq!(world.y, 0.0, epsilon = 1e-5);
    assert_relative_eq!(world.z, 1.0, epsilon = 1e-5);
}

#[test]
fn transform_builder_matches_free_function() {
    let transform = Transform::new()
        .with_scale(0.55, 0.3, 0.55)
        .with_rotation(90.0, 0.0, 0.0)
        .with_position(7.8, 8.7, -4.0);
    assert_eq!(
        transform.to_matrix(),
        compose_model_matrix(
            Vector3::new(0.55, 0.3, 0.55),
            Vector3::new(90.0, 0.0, 0.0),
            Vector3::new(7.8, 8.7, -4.0),
        )
    );

    let origin = apply(Transform::default().to_matrix(), [1.0, 2.0, 3.0]);
    assert_relative_eq!(origin.x, 1.0);
    assert_relative_eq!(origin.y, 2.0);
    assert_relative_eq!(origin.z, 3.0);
}
