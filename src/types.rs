// Core value types shared by the sampler, the particle field and the renderer.

#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// Black frame of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }
}

/// Canvas dimensions in canvas-space pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Zero area (container not laid out yet, or minimized window).
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Where the artwork was drawn. Exposed for click hit-testing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Edges are inclusive.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// "Far away" pointer position; anything this far off-canvas disables repulsion.
pub const POINTER_SENTINEL: (f32, f32) = (-1000.0, -1000.0);

/// Current pointer (canvas-local) plus the previous value for the cursor trail.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerState {
    pub current: (f32, f32),
    pub previous: (f32, f32),
}

impl Default for PointerState {
    fn default() -> Self {
        Self { current: POINTER_SENTINEL, previous: POINTER_SENTINEL }
    }
}

impl PointerState {
    /// Active unless parked at (or near) the sentinel.
    pub fn is_active(&self) -> bool {
        self.current.0 > -500.0 && self.current.1 > -500.0
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.previous = self.current;
        self.current = (x, y);
    }

    /// Pointer left the canvas / touch ended.
    pub fn leave(&mut self) {
        self.previous = self.current;
        self.current = POINTER_SENTINEL;
    }
}
