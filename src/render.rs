// Render sink: the effect produces one draw command per particle per frame;
// the sink turns those into pixels. `Canvas` is the software implementation
// that fills the frame buffer handed to the window.

use crate::gamma::GammaLut;
use crate::types::FrameBuffer;

/// One filled circle: position, radius, colour (0x00RRGGBB) and opacity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCommand {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: u32,
    pub alpha: f32,
}

/// What the effect needs from a renderer. Creating the sink creates the
/// context; dropping it tears the context down.
pub trait RenderSink {
    fn resize(&mut self, width: usize, height: usize);
    fn clear(&mut self);
    fn draw_circle(&mut self, cmd: &DrawCommand);
}

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
pub fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Software sink backed by a `FrameBuffer`.
pub struct Canvas {
    pub frame: FrameBuffer,
    pub background: u32,
    lut: GammaLut,
}

impl Canvas {
    pub fn new(width: usize, height: usize, background: u32) -> Self {
        let mut frame = FrameBuffer::new(width, height);
        frame.pixels.fill(background);
        Self { frame, background, lut: GammaLut::new() }
    }

    #[inline]
    fn blend_pixel(&mut self, x: i32, y: i32, color: u32, alpha: f32) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.frame.width || y >= self.frame.height {
            return;
        }
        let idx = y * self.frame.width + x;
        self.frame.pixels[idx] = self.lut.blend(self.frame.pixels[idx], color, alpha);
    }
}

impl RenderSink for Canvas {
    fn resize(&mut self, width: usize, height: usize) {
        if width == self.frame.width && height == self.frame.height {
            return;
        }
        self.frame = FrameBuffer::new(width, height);
        self.frame.pixels.fill(self.background);
    }

    fn clear(&mut self) {
        self.frame.pixels.fill(self.background);
    }

    /// Pixels whose centers lie inside the circle get the command's alpha.
    fn draw_circle(&mut self, cmd: &DrawCommand) {
        if cmd.radius <= 0.0 || cmd.alpha <= 0.0 || !cmd.x.is_finite() || !cmd.y.is_finite() {
            return;
        }
        let r2 = cmd.radius * cmd.radius;
        let x0 = (cmd.x - cmd.radius).floor() as i32;
        let x1 = (cmd.x + cmd.radius).ceil() as i32;
        let y0 = (cmd.y - cmd.radius).floor() as i32;
        let y1 = (cmd.y + cmd.radius).ceil() as i32;

        // Scan just the bounding box (particles are a few pixels wide)
        for y in y0..=y1 {
            let dy = y as f32 + 0.5 - cmd.y;
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cmd.x;
                if dx * dx + dy * dy <= r2 {
                    self.blend_pixel(x, y, cmd.color, cmd.alpha);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(x: f32, y: f32, radius: f32, alpha: f32) -> DrawCommand {
        DrawCommand { x, y, radius, color: 0x00_F0_F0_F0, alpha }
    }

    #[test]
    fn opaque_circle_covers_center_not_corner() {
        let mut c = Canvas::new(16, 16, 0);
        c.draw_circle(&cmd(8.0, 8.0, 3.5, 1.0));
        assert_eq!(c.frame.pixels[8 * 16 + 8], 0x00_F0_F0_F0);
        assert_eq!(c.frame.pixels[0], 0);
        assert_eq!(c.frame.pixels[4 * 16 + 4], 0); // outside radius diagonally
    }

    #[test]
    fn off_canvas_circles_are_clipped() {
        let mut c = Canvas::new(8, 8, 0);
        c.draw_circle(&cmd(-0.5, -0.5, 2.0, 1.0));
        c.draw_circle(&cmd(100.0, 100.0, 2.0, 1.0));
        c.draw_circle(&cmd(f32::NAN, 3.0, 2.0, 1.0));
        assert_eq!(c.frame.pixels[0], 0x00_F0_F0_F0);
        assert_eq!(c.frame.pixels.iter().filter(|&&p| p != 0).count(), 1);
    }

    #[test]
    fn resize_and_clear_reset_to_background() {
        let mut c = Canvas::new(4, 4, 0x00_11_22_33);
        c.draw_circle(&cmd(2.0, 2.0, 1.0, 0.6));
        c.clear();
        assert!(c.frame.pixels.iter().all(|&p| p == 0x00_11_22_33));
        c.resize(10, 5);
        assert_eq!(c.frame.pixels.len(), 50);
        assert!(c.frame.pixels.iter().all(|&p| p == 0x00_11_22_33));
    }
}
