//=========================================================================
// Texture Cache
//=========================================================================
//
// Kernel-backed texture cache keyed by file name.
//
// Lookup:
//   canvas unset            → Runtime error
//   name cached             → shared handle
//   kernel.load_texture()   → None: Runtime error, Some: cache + return
//
// Textures belong to the kernel that created them: `release_all` must
// run before that kernel is destroyed. The engine does this on drop.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{debug, info};

//=== Internal Dependencies ===============================================

use crate::core::error::{EngineError, EngineResult};
use crate::core::kernel::{Canvas, Kernel, Texture};

//=== TextureCache ========================================================

pub struct TextureCache {
    textures: HashMap<String, Rc<dyn Texture>>,
    textures_dir: PathBuf,
    canvas: Option<Rc<dyn Canvas>>,
}

impl TextureCache {
    pub fn new(textures_dir: impl Into<PathBuf>) -> Self {
        Self {
            textures: HashMap::new(),
            textures_dir: textures_dir.into(),
            canvas: None,
        }
    }

    /// Returns the texture for `name`, loading it through `kernel` on the
    /// first request. `name` is relative to the textures directory.
    pub fn get(&mut self, kernel: &mut dyn Kernel, name: &str) -> EngineResult<Rc<dyn Texture>> {
        let canvas = self
            .canvas
            .as_ref()
            .ok_or_else(|| EngineError::Runtime(format!("no canvas set to load texture '{name}'")))?;

        if let Some(texture) = self.textures.get(name) {
            return Ok(Rc::clone(texture));
        }

        let path = self.textures_dir.join(name);
        let texture: Rc<dyn Texture> = kernel
            .load_texture(&**canvas, &path)
            .map(Rc::from)
            .ok_or_else(|| {
                EngineError::Runtime(format!("can't load texture '{}'", path.display()))
            })?;

        debug!(
            "Loaded texture '{}' ({}x{})",
            name,
            texture.width(),
            texture.height()
        );
        self.textures.insert(name.to_string(), Rc::clone(&texture));

        Ok(texture)
    }

    /// Drops every cached texture.
    pub fn release_all(&mut self) {
        if !self.textures.is_empty() {
            info!("Releasing {} texture(s)", self.textures.len());
        }
        self.textures.clear();
    }

    //--- Settings ---------------------------------------------------------

    /// Changes where names are resolved. Already cached textures stay.
    pub fn set_textures_dir(&mut self, dir: impl Into<PathBuf>) {
        self.textures_dir = dir.into();
    }

    pub fn textures_dir(&self) -> &Path {
        &self.textures_dir
    }

    pub fn set_canvas(&mut self, canvas: Rc<dyn Canvas>) {
        self.canvas = Some(canvas);
    }

    pub fn clear_canvas(&mut self) {
        self.canvas = None;
    }

    pub fn has_canvas(&self) -> bool {
        self.canvas.is_some()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new(".")
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
