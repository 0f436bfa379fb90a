//! WGSL validation and a name-keyed cache of compiled shader modules.

use log::{debug, info};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use wgpu::{ShaderModuleDescriptor, ShaderSource};

#[derive(Debug, Error)]
pub enum ShaderError {
    /// `message` is the front-end or validator diagnostic, rendered against the source.
    #[error("shader '{name}' failed to compile: {message}")]
    CompilationFailed { name: String, message: String },

    #[error("shader '{name}' not found in library")]
    NotLoaded { name: String },
}

/// Parse and validate WGSL without touching the GPU.
pub fn validate_wgsl(name: &str, source: &str) -> Result<(), ShaderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::CompilationFailed {
        name: name.to_string(),
        message: e.emit_to_string(source),
    })?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|e| ShaderError::CompilationFailed {
        name: name.to_string(),
        message: e.emit_to_string(source),
    })?;

    Ok(())
}

/// Central registry for compiled shader modules.
pub struct ShaderLibrary {
    modules: HashMap<String, Arc<wgpu::ShaderModule>>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
        }
    }

    /// Validate `source` and compile it into a module cached under `name`.
    /// A module already cached under the same name is replaced.
    pub fn load_from_source(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        source: &str,
    ) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        debug!("Loading shader '{}' from source", name);
        validate_wgsl(name, source)?;

        let module = device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        });

        let arc_module = Arc::new(module);
        let replaced = self
            .modules
            .insert(name.to_string(), arc_module.clone())
            .is_some();

        if replaced {
            info!("Replaced shader '{}'", name);
        } else {
            info!("Loaded shader '{}'", name);
        }

        Ok(arc_module)
    }

    /// Get a previously loaded shader by name.
    pub fn get(&self, name: &str) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        self.modules
            .get(name)
            .cloned()
            .ok_or_else(|| ShaderError::NotLoaded {
                name: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Drop every cached module.
    pub fn clear(&mut self) {
        self.modules.clear();
    }
}

impl Default for ShaderLibrary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_test_device_queue;

    const VALID_SHADER: &str = r#"
        @vertex
        fn vs_main(@builtin(vertex_index) idx: u32) -> @builtin(position) vec4<f32> {
            return vec4<f32>(0.0, 0.0, 0.0, 1.0);
        }

        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            return vec4<f32>(1.0, 0.0, 0.0, 1.0);
        }
    "#;

    const UNDECLARED_SHADER: &str = r#"
        @vertex
        fn vs_main() -> @builtin(position) vec4<f32> {
            return undeclared_variable;
        }
    "#;

    const MISTYPED_SHADER: &str = r#"
        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            let a: f32 = 1.0;
            let b: u32 = 2u;
            return vec4<f32>(a + b);
        }
    "#;

    #[test]
    fn test_valid_shader_passes_validation() {
        assert!(validate_wgsl("valid", VALID_SHADER).is_ok());
    }

    #[test]
    fn test_undeclared_identifier_reports_diagnostic() {
        let err = validate_wgsl("bad", UNDECLARED_SHADER).unwrap_err();
        match err {
            ShaderError::CompilationFailed { name, message } => {
                assert_eq!(name, "bad");
                assert!(message.contains("undeclared_variable"), "{message}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        assert!(matches!(
            validate_wgsl("mistyped", MISTYPED_SHADER),
            Err(ShaderError::CompilationFailed { .. })
        ));
    }

    #[test]
    fn test_error_display_names_the_shader() {
        let err = validate_wgsl("sprite", "fn broken( {").unwrap_err();
        assert!(err.to_string().starts_with("shader 'sprite' failed to compile"));
    }

    #[test]
    fn test_shader_library_starts_empty() {
        let library = ShaderLibrary::new();
        assert!(library.is_empty());
        assert!(matches!(
            library.get("nonexistent"),
            Err(ShaderError::NotLoaded { .. })
        ));
    }

    #[test]
    fn test_invalid_source_never_reaches_the_device() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let mut library = ShaderLibrary::new();
        let result = library.load_from_source(&device, "bad", UNDECLARED_SHADER);
        assert!(matches!(result, Err(ShaderError::CompilationFailed { .. })));
        assert!(library.is_empty());
    }

    #[test]
    fn test_cache_returns_same_module_for_same_name() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let mut library = ShaderLibrary::new();
        library
            .load_from_source(&device, "shared", VALID_SHADER)
            .unwrap();

        let a = library.get("shared").unwrap();
        let b = library.get("shared").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_reload_replaces_cached_module() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let mut library = ShaderLibrary::new();
        library
            .load_from_source(&device, "reloadable", VALID_SHADER)
            .unwrap();
        let original = library.get("reloadable").unwrap();
        library
            .load_from_source(&device, "reloadable", VALID_SHADER)
            .unwrap();
        let reloaded = library.get("reloadable").unwrap();

        assert!(!Arc::ptr_eq(&original, &reloaded));
        assert_eq!(library.len(), 1);
        library.clear();
        assert!(library.is_empty());
    }
}
