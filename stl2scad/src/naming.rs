//! Model, module and output file naming.

use std::path::{Path, PathBuf};

/// Model name used when neither the solid nor the file name is usable.
pub const FALLBACK_MODEL_NAME: &str = "stlmodule";

/// Base name for the modules generated from one STL file.
///
/// Prefers the solid name, then the file stem, then the whole file name,
/// and finally [`FALLBACK_MODEL_NAME`]. The result is always a valid
/// OpenSCAD identifier.
pub fn model_name(solid_name: &str, path: &Path) -> String {
    sanitize_identifier(&choose_name(solid_name.trim(), path))
}

fn choose_name(solid_name: &str, path: &Path) -> String {
    if solid_name.chars().count() > 1 {
        return solid_name.to_string();
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (stem, extension) = split_extension(&file_name);
    let name = if stem.chars().count() > 1 && extension.chars().count() < 5 {
        stem.to_string()
    } else {
        file_name
    };

    if name.chars().count() < 2 {
        FALLBACK_MODEL_NAME.to_string()
    } else {
        name
    }
}

/// Split `name.ext` into `("name", ".ext")`. Leading dots do not start an
/// extension, so `.hidden` has none.
fn split_extension(file_name: &str) -> (&str, &str) {
    let body_start = file_name.len() - file_name.trim_start_matches('.').len();
    match file_name[body_start..].rfind('.') {
        Some(dot) => file_name.split_at(body_start + dot),
        None => (file_name, ""),
    }
}

/// Replace characters outside `[A-Za-z0-9_]` with `_`, and prefix `_` when
/// the name starts with a digit.
pub fn sanitize_identifier(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

/// One module file to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOutput {
    /// Output file path.
    pub path: PathBuf,
    /// Module defined in the file.
    pub module_name: String,
}

/// Every file produced for one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPlan {
    /// One module file per object, in object order.
    pub modules: Vec<ModuleOutput>,
    /// Wrapper file, present only for multi-object models.
    pub wrapper: Option<PathBuf>,
}

/// Plan output files for `object_count` objects of a model.
///
/// A single object is written to `<model>.scad` as module `<model>`.
/// Several objects go to `<model>_001.scad`, `<model>_002.scad`, ... as
/// modules `<model>001`, `<model>002`, ..., plus a wrapper `<model>.scad`.
pub fn plan_outputs(dir: &Path, model: &str, object_count: usize) -> OutputPlan {
    if object_count == 1 {
        return OutputPlan {
            modules: vec![ModuleOutput {
                path: dir.join(format!("{model}.scad")),
                module_name: model.to_string(),
            }],
            wrapper: None,
        };
    }

    let modules = (1..=object_count)
        .map(|seq| ModuleOutput {
            path: dir.join(format!("{model}_{seq:03}.scad")),
            module_name: format!("{model}{seq:03}"),
        })
        .collect();

    OutputPlan {
        modules,
        wrapper: (object_count > 1).then(|| dir.join(format!("{model}.scad"))),
    }
}
