// Forward kinematics of a segment chain

use nalgebra_glm as glm;

use super::segment::{Axis, Segment};

/// Rotation of `angle` radians about a principal axis.
pub fn axis_rotation(axis: Axis, angle: f64) -> glm::DMat4 {
    glm::rotation(angle, &axis.unit())
}

/// Homogeneous transform from Euler angles applied in `sequence` order, then a translation.
///
/// `angles[i]` turns about `sequence[i]`; the resulting rotation is
/// `R(sequence[0]) · R(sequence[1]) · …`.
pub fn euler_transform(angles: &[f64], sequence: &[Axis], translation: glm::DVec3) -> glm::DMat4 {
    let rotation = sequence
        .iter()
        .zip(angles)
        .fold(glm::DMat4::identity(), |acc, (&axis, &angle)| {
            acc * axis_rotation(axis, angle)
        });
    glm::translation(&translation) * rotation
}

/// Transform of a segment relative to its parent for the segment's slice of `q`.
///
/// Translations come first in `q`, then rotations in listed order.
pub fn local_transform(segment: &Segment, q: &[f64]) -> glm::DMat4 {
    let q = &q[segment.first_q..segment.first_q + segment.nb_q()];
    let (q_trans, q_rot) = q.split_at(segment.translations.len());

    let translation = segment
        .translations
        .iter()
        .zip(q_trans)
        .fold(glm::DVec3::zeros(), |acc, (&axis, &value)| {
            acc + axis.unit() * value
        });
    let rotation = segment
        .rotations
        .iter()
        .zip(q_rot)
        .fold(glm::DMat4::identity(), |acc, (&axis, &angle)| {
            acc * axis_rotation(axis, angle)
        });

    segment.rt * glm::translation(&translation) * rotation
}

/// Global transform of every segment. Parents must precede their children.
pub fn global_transforms(segments: &[Segment], q: &[f64]) -> Vec<glm::DMat4> {
    let mut globals: Vec<glm::DMat4> = Vec::with_capacity(segments.len());
    for segment in segments {
        let parent = segment
            .parent
            .map(|p| globals[p])
            .unwrap_or_else(glm::DMat4::identity);
        globals.push(parent * local_transform(segment, q));
    }
    globals
}

pub fn transform_point(m: &glm::DMat4, p: &glm::DVec3) -> glm::DVec3 {
    let h = m * glm::vec4(p.x, p.y, p.z, 1.0);
    glm::vec3(h.x, h.y, h.z)
}

pub fn translation_part(m: &glm::DMat4) -> glm::DVec3 {
    glm::vec3(m[(0, 3)], m[(1, 3)], m[(2, 3)])
}

pub fn rotation_part(m: &glm::DMat4) -> glm::DMat3 {
    glm::mat4_to_mat3(m)
}
