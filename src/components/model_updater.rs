use nalgebra_glm as glm;
use rerun::RecordingStream;
use std::path::{Path, PathBuf};

use super::{LocalFrame, to_columns, to_f32};
use crate::error::BioError;
use crate::model::{KinematicModel, rotation_part, translation_part};
use crate::settings::Settings;

/// Grey used for inline meshes without `meshcolor`.
const DEFAULT_MESH_COLOR: [f64; 3] = [0.89, 0.855, 0.788];

enum MeshKind {
    File {
        path: PathBuf,
        media_type: rerun::MediaType,
    },
    /// Closed polyline through inline vertices.
    Inline {
        vertices: Vec<[f32; 3]>,
        color: [u8; 4],
    },
}

struct MeshEntry {
    segment: usize,
    entity: String,
    kind: MeshKind,
}

impl MeshEntry {
    fn for_segment(model: &dyn KinematicModel, segment: usize, entity: String) -> Option<Self> {
        if let Some(path) = model.mesh_file(segment) {
            let Some(media_type) = media_type(&path) else {
                log::warn!(
                    "{}: mesh {} is not stl, obj or gltf, it will not be displayed",
                    entity,
                    path.display()
                );
                return None;
            };
            return Some(Self {
                segment,
                entity,
                kind: MeshKind::File { path, media_type },
            });
        }

        let mut vertices: Vec<[f32; 3]> = model.mesh_vertices(segment).iter().map(to_f32).collect();
        if vertices.len() > 2 {
            vertices.push(vertices[0]);
        }
        let [r, g, b] = model
            .mesh_color(segment)
            .unwrap_or(DEFAULT_MESH_COLOR)
            .map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        (!vertices.is_empty()).then(|| Self {
            segment,
            entity,
            kind: MeshKind::Inline {
                vertices,
                color: [r, g, b, 255],
            },
        })
    }

    fn log_static(&self, rec: &RecordingStream) -> Result<(), BioError> {
        match &self.kind {
            MeshKind::File { path, media_type } => {
                let contents = std::fs::read(path).map_err(|e| {
                    BioError::new("mesh-read")
                        .with_arg("path", path.display())
                        .push_std(e)
                })?;
                rec.log_static(
                    self.entity.as_str(),
                    &rerun::Asset3D::from_file_contents(contents, Some(media_type.clone())),
                )?;
            }
            MeshKind::Inline { vertices, color } => {
                rec.log_static(
                    self.entity.as_str(),
                    &rerun::LineStrips3D::new([vertices.clone()]).with_colors([*color]),
                )?;
            }
        }
        Ok(())
    }
}

/// Logs one animated model: segment frames, markers, centre of mass and meshes.
pub struct ModelUpdater {
    pub name: String,
    model: Box<dyn KinematicModel>,
    local_frames: Vec<LocalFrame>,
    meshes: Vec<MeshEntry>,
    marker_names: Vec<String>,
    has_mass: bool,
    settings: Settings,
}

impl ModelUpdater {
    pub fn new(name: impl Into<String>, model: Box<dyn KinematicModel>, settings: &Settings) -> Self {
        let name = name.into();
        let segment_names = model.segment_names();
        let local_frames = segment_names
            .iter()
            .map(|segment| {
                LocalFrame::new(format!("{name}/{segment}"))
                    .with_scale(settings.display.local_frame_scale as f64)
            })
            .collect();

        let meshes = model
            .segments_with_mesh()
            .into_iter()
            .filter_map(|segment| {
                let entity = format!("{name}/{}/mesh", segment_names[segment]);
                MeshEntry::for_segment(&*model, segment, entity)
            })
            .collect();

        let has_mass = model.center_of_mass(&vec![0.0; model.nb_q()]).is_ok();
        Self {
            marker_names: model.marker_names(),
            name,
            model,
            local_frames,
            meshes,
            has_mass,
            settings: settings.clone(),
        }
    }

    fn markers_entity(&self) -> String {
        format!("{}/markers", self.name)
    }

    fn center_of_mass_entity(&self) -> String {
        format!("{}/center_of_mass", self.name)
    }

    pub fn component_names(&self) -> Vec<String> {
        let display = &self.settings.display;
        let mut names = Vec::new();
        if display.show_local_frames {
            names.extend(self.local_frames.iter().flat_map(LocalFrame::component_names));
        }
        if display.show_meshes {
            names.extend(self.meshes.iter().map(|m| m.entity.clone()));
        }
        if !self.marker_names.is_empty() {
            names.push(self.markers_entity());
        }
        if display.show_center_of_mass && self.has_mass {
            names.push(self.center_of_mass_entity());
        }
        names
    }

    /// Mesh assets and inline outlines, sent once; their transforms follow in [`to_rerun`](Self::to_rerun).
    pub fn log_static(&self, rec: &RecordingStream) -> Result<(), BioError> {
        if !self.settings.display.show_meshes {
            return Ok(());
        }
        for mesh in &self.meshes {
            mesh.log_static(rec)?;
        }
        Ok(())
    }

    pub fn to_rerun(&self, rec: &RecordingStream, q: &[f64]) -> Result<(), BioError> {
        let display = &self.settings.display;
        let colors = &self.settings.colors;
        let globals = self.model.all_segment_matrices_in_global(q)?;

        if display.show_local_frames {
            for (frame, transform) in self.local_frames.iter().zip(&globals) {
                frame.to_rerun(rec, transform)?;
            }
        }

        if display.show_meshes {
            for mesh in &self.meshes {
                let placed = globals[mesh.segment] * self.model.mesh_placement(mesh.segment);
                log_transform(rec, &mesh.entity, &placed)?;
            }
        }

        if !self.marker_names.is_empty() {
            let positions: Vec<[f32; 3]> = self.model.markers(q)?.iter().map(to_f32).collect();
            rec.log(
                self.markers_entity(),
                &rerun::Points3D::new(positions)
                    .with_radii([display.marker_radius])
                    .with_colors([colors.model_marker_color])
                    .with_labels(self.marker_names.clone()),
            )?;
        }

        if display.show_center_of_mass && self.has_mass {
            let com = self.model.center_of_mass(q)?;
            rec.log(
                self.center_of_mass_entity(),
                &rerun::Points3D::new([to_f32(&com)])
                    .with_radii([display.marker_radius * 1.5])
                    .with_colors([colors.center_of_mass_color]),
            )?;
        }
        Ok(())
    }
}

fn log_transform(rec: &RecordingStream, entity: &str, m: &glm::DMat4) -> Result<(), BioError> {
    rec.log(
        entity,
        &rerun::Transform3D::from_translation_mat3x3(
            to_f32(&translation_part(m)),
            to_columns(&rotation_part(m)),
        ),
    )?;
    Ok(())
}

fn media_type(path: &Path) -> Option<rerun::MediaType> {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .as_deref()
    {
        Some("stl") => Some(rerun::MediaType::stl()),
        Some("obj") => Some(rerun::MediaType::obj()),
        Some("glb") => Some(rerun::MediaType::glb()),
        Some("gltf") => Some(rerun::MediaType::gltf()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BiomodModel;

    const ARM: &str = "
        segment arm
            rotations x
            mass 2
            meshfile arm.vtp
        endsegment
        marker tip
            parent arm
            position 0 0 -1
        endmarker
    ";

    fn updater(settings: &Settings) -> ModelUpdater {
        let model = BiomodModel::parse("arm", ARM).unwrap();
        ModelUpdater::new("animation/0_arm", Box::new(model), settings)
    }

    #[test]
    fn unsupported_meshes_are_dropped() {
        let updater = updater(&Settings::default());
        assert!(
            !updater
                .component_names()
                .iter()
                .any(|n| n.ends_with("/mesh"))
        );
    }

    #[test]
    fn names_cover_frames_markers_and_com() {
        let names = updater(&Settings::default()).component_names();
        assert_eq!(
            names,
            vec![
                "animation/0_arm/arm/X",
                "animation/0_arm/arm/Y",
                "animation/0_arm/arm/Z",
                "animation/0_arm/markers",
                "animation/0_arm/center_of_mass",
            ]
        );
    }

    #[test]
    fn hidden_local_frames_are_not_named() {
        let mut settings = Settings::default();
        settings.display.show_local_frames = false;
        let names = updater(&settings).component_names();
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn logs_a_pose() {
        let (rec, _storage) = rerun::RecordingStreamBuilder::new("model_updater_test")
            .memory()
            .unwrap();
        let updater = updater(&Settings::default());
        updater.log_static(&rec).unwrap();
        updater.to_rerun(&rec, &[0.3]).unwrap();
        assert!(updater.to_rerun(&rec, &[0.3, 0.1]).is_err());
    }

    const BOX: &str = "
        segment box
            translations z
            mesh 0 0 0
            mesh 1 0 0
            mesh 1 1 0
            meshcolor 1 0 0
        endsegment
        segment lid
            parent box
            mesh 0 0 1
        endsegment
    ";

    #[test]
    fn inline_meshes_become_outlines() {
        let model = BiomodModel::parse("box", BOX).unwrap();
        assert_eq!(model.segments_with_mesh(), vec![0, 1]);
        assert!(model.mesh_paths().is_empty());

        let updater = ModelUpdater::new("animation/0_box", Box::new(model), &Settings::default());
        let names = updater.component_names();
        assert!(names.contains(&"animation/0_box/box/mesh".to_string()));
        assert!(names.contains(&"animation/0_box/lid/mesh".to_string()));

        match &updater.meshes[0].kind {
            MeshKind::Inline { vertices, color } => {
                assert_eq!(vertices.len(), 4);
                assert_eq!(vertices[3], vertices[0]);
                assert_eq!(*color, [255, 0, 0, 255]);
            }
            MeshKind::File { .. } => panic!("expected an inline mesh"),
        }
        match &updater.meshes[1].kind {
            MeshKind::Inline { vertices, color } => {
                assert_eq!(vertices.len(), 1);
                assert_eq!(*color, [227, 218, 201, 255]);
            }
            MeshKind::File { .. } => panic!("expected an inline mesh"),
        }

        let (rec, storage) = rerun::RecordingStreamBuilder::new("inline_mesh_test")
            .memory()
            .unwrap();
        updater.log_static(&rec).unwrap();
        updater.to_rerun(&rec, &[0.2]).unwrap();
        assert!(!storage.take().is_empty());
    }

    #[test]
    fn media_types_follow_extension() {
        assert!(media_type(Path::new("a/b.STL")).is_some());
        assert!(media_type(Path::new("a/b.vtp")).is_none());
    }
}
