//! End-to-end frame tests: renderer output replayed through a vt100 screen.

mod common;

use common::{Screen, count, cursor_moves, headless_renderer, headless_options, headless_renderer_with};
use vtframe::{Rgba, TextAttributes};

fn draw_hello(renderer: &mut vtframe::Renderer) {
    renderer
        .draw_text("Hello", 0, 0, Rgba::WHITE, None, TextAttributes::empty())
        .unwrap();
    renderer
        .draw_text("world", 2, 1, Rgba::GREEN, None, TextAttributes::BOLD)
        .unwrap();
}

// ============================================
// Scenarios
// ============================================

#[test]
fn test_hi_on_black_scenario() {
    let (mut renderer, sink) = headless_renderer(10, 3);
    renderer.next_buffer().clear(Rgba::BLACK, None);
    renderer
        .draw_text("Hi", 0, 0, Rgba::WHITE, Some(Rgba::BLACK), TextAttributes::empty())
        .unwrap();
    renderer.render(true);

    let out = sink.take_string();
    assert_eq!(count(&out, "\x1b[1;1H"), 1);
    assert!(out.contains("\x1b[1;1H\x1b[0;38;2;255;255;255;48;2;0;0;0mHi"));
    // The remaining background cells form one run per row.
    assert_eq!(count(&out, "\x1b[0;39;48;2;0;0;0m"), 3);
    assert!(out.contains("\x1b[1;3H\x1b[0;39;48;2;0;0;0m        \x1b[0m"));
    assert_eq!(cursor_moves(&out), 4);

    let mut screen = Screen::new(10, 3);
    screen.feed(out.as_bytes());
    assert_eq!(screen.rows(), vec!["Hi", "", ""]);
    let h = screen.cell(0, 0);
    assert_eq!(h.fgcolor(), vt100::Color::Rgb(255, 255, 255));
    assert_eq!(h.bgcolor(), vt100::Color::Rgb(0, 0, 0));
    assert_eq!(screen.cell(0, 9).bgcolor(), vt100::Color::Rgb(0, 0, 0));
}

#[test]
fn test_identical_frame_emits_nothing() {
    let (mut renderer, sink) = headless_renderer(20, 4);
    draw_hello(&mut renderer);
    renderer.render(false);
    assert!(sink.len() > 0);
    sink.take();

    draw_hello(&mut renderer);
    renderer.render(false);
    assert!(sink.take().is_empty());
    assert_eq!(renderer.stats().last_frame_cells, 0);
}

#[test]
fn test_forced_redraw_rewrites_every_cell() {
    let (mut renderer, sink) = headless_renderer(20, 4);
    let mut screen = Screen::new(20, 4);
    draw_hello(&mut renderer);
    renderer.render(false);
    screen.feed(&sink.take());

    draw_hello(&mut renderer);
    renderer.render(true);
    assert_eq!(renderer.stats().last_frame_cells, 20 * 4);

    let mut fresh = Screen::new(20, 4);
    let forced = sink.take();
    fresh.feed(&forced);
    screen.feed(&forced);
    assert_eq!(fresh.rows(), screen.rows());
    assert_eq!(fresh.rows()[..2], ["Hello".to_string(), "  world".to_string()]);
    assert!(fresh.cell(1, 2).bold());
}

#[test]
fn test_same_style_cells_share_one_run() {
    let (mut renderer, sink) = headless_renderer(12, 1);
    renderer.render(false);
    sink.take();

    renderer
        .draw_text("abcdef", 3, 0, Rgba::RED, None, TextAttributes::UNDERLINE)
        .unwrap();
    renderer.render(false);
    let out = sink.take_string();
    assert_eq!(cursor_moves(&out), 1);
    assert!(out.contains("\x1b[1;4H"));
    assert!(out.contains("mabcdef\x1b[0m"));
    assert_eq!(renderer.stats().last_frame_runs, 1);
}

#[test]
fn test_single_changed_cell() {
    let (mut renderer, sink) = headless_renderer(20, 4);
    let mut screen = Screen::new(20, 4);
    draw_hello(&mut renderer);
    renderer.render(false);
    screen.feed(&sink.take());

    renderer
        .draw_text("Hallo", 0, 0, Rgba::WHITE, None, TextAttributes::empty())
        .unwrap();
    renderer
        .draw_text("world", 2, 1, Rgba::GREEN, None, TextAttributes::BOLD)
        .unwrap();
    renderer.render(false);
    let out = sink.take_string();
    assert_eq!(renderer.stats().last_frame_cells, 1);
    assert_eq!(cursor_moves(&out), 1);
    assert!(out.contains("\x1b[1;2H"));

    screen.feed(out.as_bytes());
    assert_eq!(screen.rows()[0], "Hallo");
    assert_eq!(screen.rows()[1], "  world");
}

#[test]
fn test_wide_glyphs_land_in_their_columns() {
    let (mut renderer, sink) = headless_renderer(10, 1);
    renderer
        .draw_text("a中b", 0, 0, Rgba::WHITE, None, TextAttributes::empty())
        .unwrap();
    renderer.render(false);

    let mut screen = Screen::new(10, 1);
    screen.feed(&sink.take());
    assert_eq!(screen.cell(0, 0).contents(), "a");
    assert_eq!(screen.cell(0, 1).contents(), "中");
    assert_eq!(screen.cell(0, 3).contents(), "b");
}

#[test]
fn test_render_offset_moves_frame_down() {
    let mut options = headless_options();
    options.render_offset = 2;
    let (mut renderer, sink) = headless_renderer_with(6, 1, options);
    renderer
        .draw_text("top", 0, 0, Rgba::WHITE, None, TextAttributes::empty())
        .unwrap();
    renderer.render(false);

    let mut screen = Screen::new(6, 3);
    screen.feed(&sink.take());
    assert_eq!(screen.rows(), vec!["", "", "top"]);
}

#[test]
fn test_resize_80x24_to_40x24_with_hit_regions() {
    let (mut renderer, sink) = headless_renderer(80, 24);
    renderer
        .draw_text("wide layout", 60, 0, Rgba::WHITE, None, TextAttributes::empty())
        .unwrap();
    renderer.add_to_hit_grid(0, 0, 80, 24, 1);
    renderer.add_to_hit_grid(60, 0, 20, 1, 2);
    renderer.render(false);
    assert_eq!(renderer.check_hit(65, 0), 2);
    sink.take();

    renderer.resize(40, 24).unwrap();
    assert_eq!(renderer.check_hit(65, 0), 0);
    assert_eq!(renderer.check_hit(10, 10), 0);

    renderer
        .draw_text("narrow", 30, 0, Rgba::WHITE, None, TextAttributes::empty())
        .unwrap();
    renderer.add_to_hit_grid(0, 0, 40, 24, 1);
    renderer.add_to_hit_grid(30, 0, 20, 1, 3);
    renderer.render(false);

    assert_eq!(renderer.check_hit(35, 0), 3);
    assert_eq!(renderer.check_hit(39, 23), 1);
    assert_eq!(renderer.check_hit(40, 0), 0);
    assert_eq!(renderer.stats().last_frame_cells, 40 * 24);

    let mut screen = Screen::new(40, 24);
    screen.feed(&sink.take());
    assert_eq!(screen.rows()[0].trim_start(), "narrow");

    // Growing again is fine too; content is not expected to survive.
    renderer.resize(80, 24).unwrap();
    renderer.render(false);
    assert_eq!(renderer.current_buffer().size(), (80, 24));
}

#[test]
fn test_hyperlinks_wrap_linked_cells() {
    let (mut renderer, sink) = headless_renderer(12, 1);
    renderer.capabilities_mut().hyperlinks = true;
    let id = renderer.link_pool().intern("https://example.com").unwrap();
    let attrs = TextAttributes::empty().with_link_id(id);
    renderer
        .draw_text("docs", 0, 0, Rgba::WHITE, None, attrs)
        .unwrap();
    renderer.render(false);

    let out = sink.take_string();
    assert!(out.contains("https://example.com"));
    assert!(out.contains("\x1b]8;;\x1b\\"));
    let mut screen = Screen::new(12, 1);
    screen.feed(out.as_bytes());
    assert_eq!(screen.rows()[0], "docs");
}

#[test]
fn test_hyperlink_stays_open_across_skipped_cell() {
    let (mut renderer, sink) = headless_renderer(8, 1);
    renderer.capabilities_mut().hyperlinks = true;
    let id = renderer.link_pool().intern("https://example.com").unwrap();
    let attrs = TextAttributes::empty().with_link_id(id);
    renderer
        .draw_text("abcd", 0, 0, Rgba::WHITE, None, attrs)
        .unwrap();
    renderer.render(false);
    let mut screen = Screen::new(8, 1);
    screen.feed(&sink.take());

    // Only columns 0 and 2 change; column 1 is skipped and keeps the link.
    renderer
        .draw_text("XbYd", 0, 0, Rgba::WHITE, None, attrs)
        .unwrap();
    renderer.render(false);
    let out = sink.take_string();
    assert_eq!(renderer.stats().last_frame_cells, 2);
    assert_eq!(count(&out, "https://example.com"), 1);
    assert_eq!(count(&out, "\x1b]8;;\x1b\\"), 1);
    assert!(out.find("https://example.com") < out.find("Y"));
    assert!(out.find("Y") < out.find("\x1b]8;;\x1b\\"));

    screen.feed(out.as_bytes());
    assert_eq!(screen.rows()[0], "XbYd");
}

#[test]
fn test_wide_clear_fill_renders_as_spaces() {
    let (mut renderer, sink) = headless_renderer(6, 1);
    renderer.next_buffer().clear(Rgba::BLACK, Some('中'));
    renderer
        .draw_text("x", 5, 0, Rgba::WHITE, None, TextAttributes::empty())
        .unwrap();
    renderer.render(false);

    let out = sink.take_string();
    assert!(!out.contains('中'));
    assert_eq!(cursor_moves(&out), 1);
    let mut screen = Screen::new(6, 1);
    screen.feed(out.as_bytes());
    assert_eq!(screen.rows()[0], "     x");
    assert_eq!(screen.cell(0, 5).contents(), "x");
    assert_eq!(screen.cell(0, 0).bgcolor(), vt100::Color::Rgb(0, 0, 0));
}
