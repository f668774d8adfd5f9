//! Platform seams: the opaque drawing surface plus traits a host embeds to
//! supply assets, input, and persistence. The core never talks to a real
//! window or disk directly.

/// Opaque render target handed to render passes. The core only ever clears
/// it; hosts downcast to their concrete surface inside their behaviors.
pub trait Surface {
    /// Wipe the target at the start of a render pass
    fn clear(&mut self);
}

/// Surface that draws nothing. Useful in tests and headless runs.
#[derive(Debug, Default)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn clear(&mut self) {}
}

/// Handle to a host-loaded image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHandle {
    /// Host-assigned identifier
    pub id: u32,
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
}

/// Host-side asset loading
pub trait ResourceProvider {
    /// Load an image by path, returning a handle usable with this provider
    fn load_image(&mut self, path: &str) -> Option<ImageHandle>;
}

/// Host-side input sampling, polled once per frame
pub trait InputProvider {
    /// Whether the named key is currently held
    fn is_key_down(&self, key: &str) -> bool;
    /// Pointer position in surface coordinates, if a pointer exists
    fn pointer_position(&self) -> Option<(f32, f32)>;
}

/// Host-side persistence for small save-game style blobs
pub trait KeyValueStore {
    /// Fetch a stored string
    fn get(&self, key: &str) -> Option<String>;
    /// Store a string, overwriting any previous value
    fn set(&mut self, key: &str, value: &str);
    /// Remove a stored string
    fn remove(&mut self, key: &str);
}
