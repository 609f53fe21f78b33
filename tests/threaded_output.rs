//! Threaded writer: frames and control writes reach the sink in order.

mod common;

use common::{Screen, headless_options, headless_renderer, headless_renderer_with};
use vtframe::{Rgba, TextAttributes};

fn draw_counter(renderer: &mut vtframe::Renderer, frame: u32) {
    renderer
        .draw_text(&format!("frame {frame:03}"), 0, 0, Rgba::WHITE, None, TextAttributes::empty())
        .unwrap();
    renderer.fill_rect(frame % 16, 1, 1, 1, Rgba::from_rgb_u8(200, 0, 0));
}

#[test]
fn test_threaded_frames_match_synchronous_output() {
    let (mut sync, sync_sink) = headless_renderer(16, 2);
    let (mut threaded, threaded_sink) = headless_renderer(16, 2);
    threaded.set_use_thread(true).unwrap();

    for frame in 0..40 {
        draw_counter(&mut sync, frame);
        sync.render(false);
        draw_counter(&mut threaded, frame);
        threaded.render(false);
    }
    threaded.set_use_thread(false).unwrap();

    assert_eq!(sync_sink.take(), threaded_sink.take());
}

#[test]
fn test_control_write_follows_pending_frame() {
    let mut options = headless_options();
    options.use_thread = true;
    let (mut renderer, sink) = headless_renderer_with(8, 1, options);
    renderer
        .draw_text("x", 0, 0, Rgba::WHITE, None, TextAttributes::empty())
        .unwrap();
    renderer.render(false);
    renderer.set_terminal_title("after").unwrap();

    let out = sink.take_string();
    let frame_end = out.find("\x1b[?2026l").unwrap();
    let title = out.find("after").unwrap();
    assert!(frame_end < title);
}

#[test]
fn test_toggling_thread_mid_session() {
    let (mut renderer, sink) = headless_renderer(12, 1);
    let mut screen = Screen::new(12, 1);
    for (frame, threaded) in [false, true, true, false, true].into_iter().enumerate() {
        renderer.set_use_thread(threaded).unwrap();
        renderer
            .draw_text(&format!("step {frame}"), 0, 0, Rgba::WHITE, None, TextAttributes::empty())
            .unwrap();
        renderer.render(false);
    }
    renderer.destroy();
    screen.feed(&sink.take());
    assert_eq!(screen.rows()[0], "step 4");
    assert_eq!(renderer.stats().write_errors, 0);
}
