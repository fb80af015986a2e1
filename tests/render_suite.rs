use pixelfx::render::{Frame, HalfBlockRenderer, Renderer};

/// Build a solid-color RGBA pixel buffer.
fn solid_pixels(w: usize, h: usize, r: u8, g: u8, b: u8) -> Vec<u8> {
    let mut buf = vec![0u8; w * h * 4];
    for px in buf.chunks_exact_mut(4) {
        px[0] = r;
        px[1] = g;
        px[2] = b;
        px[3] = 255;
    }
    buf
}

fn make_frame<'a>(pw: usize, ph: usize, pixels: &'a [u8], cell_width: u16, sync: bool) -> Frame<'a> {
    Frame {
        pixel_width: pw,
        pixel_height: ph,
        pixels_rgba: pixels,
        cell_width,
        hud: "Ripple | 60 fps",
        sync_updates: sync,
    }
}

fn render(frame: &Frame<'_>) -> String {
    let mut out = Vec::new();
    HalfBlockRenderer::new().render(frame, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn frame_geometry() {
    let px = solid_pixels(5, 7, 0, 0, 0);
    let frame = make_frame(5, 7, &px, 3, false);
    assert_eq!(frame.grid_rows(), 4);
    assert_eq!(frame.grid_cols(), 15);
    assert_eq!(make_frame(5, 7, &px, 0, false).grid_cols(), 5);
}

#[test]
fn solid_frame_sets_colors_once_per_row() {
    let px = solid_pixels(4, 4, 10, 20, 30);
    let s = render(&make_frame(4, 4, &px, 1, false));
    assert!(s.starts_with("\x1b[H\x1b[0m\x1b[?7l"));
    assert_eq!(s.matches("\x1b[38;2;10;20;30m").count(), 2);
    assert_eq!(s.matches("\x1b[48;2;10;20;30m").count(), 2);
    assert_eq!(s.matches('\u{2580}').count(), 8);
    assert_eq!(s.matches("\x1b[0m\x1b[K\r\n").count(), 2);
    assert!(s.ends_with("\x1b[?7h"));
}

#[test]
fn top_and_bottom_pixels_map_to_fg_and_bg() {
    let mut px = solid_pixels(1, 2, 0, 0, 0);
    px[..3].copy_from_slice(&[255, 0, 0]);
    px[4..7].copy_from_slice(&[0, 0, 255]);
    let s = render(&make_frame(1, 2, &px, 1, false));
    assert!(s.contains("\x1b[38;2;255;0;0m\x1b[48;2;0;0;255m\u{2580}"));
}

#[test]
fn odd_height_pairs_last_row_with_black() {
    let px = solid_pixels(2, 3, 200, 200, 200);
    let s = render(&make_frame(2, 3, &px, 1, false));
    assert_eq!(s.matches("\x1b[0m\x1b[K\r\n").count(), 2);
    assert!(s.contains("\x1b[38;2;200;200;200m\x1b[48;2;0;0;0m"));
}

#[test]
fn cell_width_repeats_the_glyph() {
    let px = solid_pixels(3, 2, 1, 1, 1);
    let s = render(&make_frame(3, 2, &px, 2, false));
    assert_eq!(s.matches('\u{2580}').count(), 6);
}

#[test]
fn sync_updates_wrap_the_frame() {
    let px = solid_pixels(2, 2, 0, 0, 0);
    let s = render(&make_frame(2, 2, &px, 1, true));
    assert!(s.starts_with("\x1b[?2026h"));
    assert!(s.ends_with("\x1b[?2026l"));
    let plain = render(&make_frame(2, 2, &px, 1, false));
    assert!(!plain.contains("2026"));
}

#[test]
fn hud_follows_the_grid() {
    let px = solid_pixels(2, 2, 0, 0, 0);
    let s = render(&make_frame(2, 2, &px, 1, false));
    let grid_end = s.rfind("\x1b[K\r\n").unwrap();
    let hud_at = s.find("Ripple | 60 fps").unwrap();
    assert!(hud_at > grid_end);
}

#[test]
fn short_or_empty_buffers_draw_nothing() {
    let px = solid_pixels(4, 4, 9, 9, 9);
    assert!(render(&make_frame(4, 5, &px, 1, false)).is_empty());
    assert!(render(&make_frame(0, 4, &px, 1, false)).is_empty());
    assert!(render(&make_frame(4, 0, &px, 1, false)).is_empty());
}

#[test]
fn renderer_state_does_not_leak_between_frames() {
    let px = solid_pixels(2, 2, 7, 8, 9);
    let frame = make_frame(2, 2, &px, 1, false);
    let mut r = HalfBlockRenderer::new();
    let mut first = Vec::new();
    let mut second = Vec::new();
    r.render(&frame, &mut first).unwrap();
    r.render(&frame, &mut second).unwrap();
    assert_eq!(first, second);
    assert_eq!(r.name(), "halfblock");
}
