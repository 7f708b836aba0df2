//! Per-file conversion pipeline.
//!
//! Conversion runs in two stages. [`prepare`] does all the mesh work and
//! touches no output files, so several inputs can be prepared in parallel.
//! [`write_outputs`] then creates the OpenSCAD files for one prepared model.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use mesh_io::{
    IoError, ScadOptions, WrapperEntry, load_stl, save_scad_module, save_scad_wrapper,
};
use mesh_surfaces::{
    IntegrityReport, analyze_integrity, merge_vertices_at_precision, split_disjoint_surfaces,
};
use mesh_types::IndexedMesh;
use tracing::debug;

use crate::info::MeshInfo;
use crate::naming::{model_name, plan_outputs};

/// What to do with each input file.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Collect a [`MeshInfo`] summary.
    pub verbose: bool,
    /// Run the integrity analysis.
    pub analyze: bool,
    /// Split into disjoint surfaces.
    pub split: bool,
    /// Output formatting.
    pub scad: ScadOptions,
}

/// A loaded and processed model, ready to be written.
#[derive(Debug)]
pub struct PreparedModel {
    pub source: PathBuf,
    pub model: String,
    pub objects: Vec<IndexedMesh>,
    pub info: Option<MeshInfo>,
    pub integrity: Option<IntegrityReport>,
}

/// Load one STL file and turn it into output objects.
pub fn prepare(path: &Path, settings: &Settings) -> Result<PreparedModel> {
    let solid =
        load_stl(path).with_context(|| format!("failed to load {} as STL", path.display()))?;
    if solid.mesh.faces.is_empty() {
        bail!("{} contains no facets", path.display());
    }

    let model = model_name(&solid.name, path);
    let info = settings
        .verbose
        .then(|| MeshInfo::from_mesh(&solid.name, &solid.mesh));

    // Points that print the same in the output must be one vertex
    let mut mesh = solid.mesh;
    let removed = merge_vertices_at_precision(&mut mesh, settings.scad.precision);
    debug!(
        model = %model,
        faces = mesh.faces.len(),
        vertices = mesh.vertices.len(),
        removed,
        "merged duplicate vertices"
    );

    let integrity = settings.analyze.then(|| analyze_integrity(&mesh));

    let objects = if settings.split {
        split_disjoint_surfaces(&mesh)
            .with_context(|| format!("failed to split {} into surfaces", path.display()))?
    } else {
        vec![mesh]
    };

    Ok(PreparedModel {
        source: path.to_path_buf(),
        model,
        objects,
        info,
        integrity,
    })
}

/// Write the OpenSCAD files for a prepared model next to its source.
///
/// Returns the paths written, module files first and then the wrapper, if
/// any. Existing files are never overwritten: if any planned file exists,
/// nothing is written.
pub fn write_outputs(prepared: &PreparedModel, options: &ScadOptions) -> Result<Vec<PathBuf>> {
    let dir = prepared.source.parent().unwrap_or_else(|| Path::new(""));
    let plan = plan_outputs(dir, &prepared.model, prepared.objects.len());

    let planned = plan
        .modules
        .iter()
        .map(|output| &output.path)
        .chain(plan.wrapper.as_ref());
    for path in planned {
        if path.exists() {
            return Err(IoError::OutputExists { path: path.clone() })
                .with_context(|| format!("refusing to write {}", prepared.model));
        }
    }

    let mut written = Vec::with_capacity(plan.modules.len() + 1);

    for (output, object) in plan.modules.iter().zip(&prepared.objects) {
        save_scad_module(&output.path, &output.module_name, object, options)
            .with_context(|| format!("failed to write {}", output.path.display()))?;
        println!("{} ==> {}", prepared.source.display(), output.path.display());
        written.push(output.path.clone());
    }

    if let Some(wrapper) = &plan.wrapper {
        let entries: Vec<WrapperEntry> = plan
            .modules
            .iter()
            .map(|output| WrapperEntry {
                file_name: output
                    .path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                module_name: output.module_name.clone(),
            })
            .collect();
        save_scad_wrapper(wrapper, &entries)
            .with_context(|| format!("failed to write {}", wrapper.display()))?;
        println!("object load wrapper ==> {}", wrapper.display());
        written.push(wrapper.clone());
    }

    Ok(written)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mesh_io::save_stl;
    use mesh_types::{MeshTopology, Vertex};
    use std::fs;

    fn tetrahedra(count: usize) -> IndexedMesh {
        let mut mesh = IndexedMesh::new();
        for i in 0..count {
            let x = 3.0 * i as f64 + 1.0;
            let base = mesh.vertices.len() as u32;
            mesh.vertices.push(Vertex::from_coords(x, 1.0, 1.0));
            mesh.vertices.push(Vertex::from_coords(x + 1.0, 1.0, 1.0));
            mesh.vertices.push(Vertex::from_coords(x, 2.0, 1.0));
            mesh.vertices.push(Vertex::from_coords(x, 1.0, 2.0));
            for f in [[0, 1, 2], [0, 3, 1], [1, 3, 2], [2, 3, 0]] {
                mesh.faces.push(f.map(|idx| idx + base));
            }
        }
        mesh
    }

    fn split_settings() -> Settings {
        Settings {
            split: true,
            ..Settings::default()
        }
    }

    #[test]
    fn prepare_merges_and_keeps_one_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pair.stl");
        save_stl(&tetrahedra(2), "twotets", &path, false).unwrap();

        let prepared = prepare(&path, &Settings::default()).unwrap();

        assert_eq!(prepared.model, "twotets");
        assert_eq!(prepared.objects.len(), 1);
        assert_eq!(prepared.objects[0].vertex_count(), 8);
        assert!(prepared.info.is_none());
        assert!(prepared.integrity.is_none());
    }

    #[test]
    fn prepare_with_split_finds_each_solid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trio.stl");
        save_stl(&tetrahedra(3), "", &path, true).unwrap();

        let settings = Settings {
            verbose: true,
            analyze: true,
            ..split_settings()
        };
        let prepared = prepare(&path, &settings).unwrap();

        assert_eq!(prepared.model, "trio");
        assert_eq!(prepared.objects.len(), 3);
        for object in &prepared.objects {
            assert_eq!(object.face_count(), 4);
            assert_eq!(object.vertex_count(), 4);
        }
        assert_eq!(prepared.info.as_ref().unwrap().vertices, 36);
        assert!(prepared.integrity.as_ref().unwrap().is_closed());
    }

    #[test]
    fn single_object_writes_one_module() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.stl");
        save_stl(&tetrahedra(1), "tet", &path, false).unwrap();

        let prepared = prepare(&path, &split_settings()).unwrap();
        let written = write_outputs(&prepared, &ScadOptions::default()).unwrap();

        assert_eq!(written, vec![dir.path().join("tet.scad")]);
        let text = fs::read_to_string(&written[0]).unwrap();
        assert!(text.starts_with("module tet() {\n"));
        assert!(text.contains("\t\tfaces=[\n"));
        assert!(text.ends_with("tet();\n"));
    }

    #[test]
    fn multiple_objects_write_modules_and_wrapper() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pair.stl");
        save_stl(&tetrahedra(2), "twotets", &path, false).unwrap();

        let prepared = prepare(&path, &split_settings()).unwrap();
        let written = write_outputs(&prepared, &ScadOptions::default()).unwrap();

        assert_eq!(
            written,
            vec![
                dir.path().join("twotets_001.scad"),
                dir.path().join("twotets_002.scad"),
                dir.path().join("twotets.scad"),
            ]
        );
        let second = fs::read_to_string(&written[1]).unwrap();
        assert!(second.starts_with("module twotets002() {\n"));

        let wrapper = fs::read_to_string(&written[2]).unwrap();
        assert_eq!(
            wrapper,
            "use <twotets_001.scad>\nuse <twotets_002.scad>\n\ntwotets001();\ntwotets002();\n"
        );
    }

    #[test]
    fn existing_output_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.stl");
        save_stl(&tetrahedra(1), "tet", &path, false).unwrap();
        fs::write(dir.path().join("tet.scad"), "keep me").unwrap();

        let prepared = prepare(&path, &Settings::default()).unwrap();
        let err = write_outputs(&prepared, &ScadOptions::default()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<IoError>(),
            Some(IoError::OutputExists { .. })
        ));
        assert_eq!(
            fs::read_to_string(dir.path().join("tet.scad")).unwrap(),
            "keep me"
        );
    }

    #[test]
    fn existing_later_output_blocks_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pair.stl");
        save_stl(&tetrahedra(2), "twotets", &path, false).unwrap();
        fs::write(dir.path().join("twotets_002.scad"), "keep me").unwrap();

        let prepared = prepare(&path, &split_settings()).unwrap();
        let err = write_outputs(&prepared, &ScadOptions::default()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<IoError>(),
            Some(IoError::OutputExists { path }) if path.ends_with("twotets_002.scad")
        ));
        assert!(!dir.path().join("twotets_001.scad").exists());
        assert!(!dir.path().join("twotets.scad").exists());

        // Removing the blocker lets a rerun write everything
        fs::remove_file(dir.path().join("twotets_002.scad")).unwrap();
        assert_eq!(write_outputs(&prepared, &ScadOptions::default()).unwrap().len(), 3);
    }

    #[test]
    fn near_equal_ascii_corners_close_the_surface() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tet.stl");
        let facets = [
            ["0 0 0", "0 1 0", "1 0 0"],
            ["0 0 0", "1.0000000001 0 0", "0 0 1"],
            ["1 0 0", "0 1 0", "0 0 1"],
            ["0 1 0", "0 0 0", "0 0 1"],
        ];
        let mut text = String::from("solid tet\n");
        for corners in facets {
            text.push_str("facet normal 0 0 0\nouter loop\n");
            for corner in corners {
                text.push_str(&format!("vertex {corner}\n"));
            }
            text.push_str("endloop\nendfacet\n");
        }
        text.push_str("endsolid tet\n");
        fs::write(&path, text).unwrap();

        let settings = Settings {
            analyze: true,
            ..split_settings()
        };
        let prepared = prepare(&path, &settings).unwrap();

        assert_eq!(prepared.objects.len(), 1);
        assert_eq!(prepared.objects[0].vertex_count(), 4);
        assert!(prepared.integrity.as_ref().unwrap().is_closed());
    }

    #[test]
    fn missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = prepare(&dir.path().join("absent.stl"), &Settings::default()).unwrap_err();
        assert!(err.to_string().contains("failed to load"));
    }

    #[test]
    fn empty_solid_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.stl");
        fs::write(&path, "solid empty\nendsolid empty\n").unwrap();

        let err = prepare(&path, &Settings::default()).unwrap_err();
        assert!(err.to_string().contains("no facets"));
    }
}
