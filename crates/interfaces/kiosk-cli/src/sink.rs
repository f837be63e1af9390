use kiosk_app_core::{Frame, FrameSink};

/// Prints every frame change to stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl FrameSink for ConsoleSink {
    fn show(&mut self, frame: &Frame) {
        println!(":: {frame}");
    }
}
