//! Snap-zone geometry.
//!
//! [`compute_zone_rect`] is a pure function of a zone and a monitor work
//! area.  All divisions floor, so a half split of an odd dimension leaves a
//! single-pixel gap on the far edge rather than overlapping.

use crate::model::{Rect, SnapZone};

/// Fraction of the work area covered by [`SnapZone::Center`], as `num / den`.
const CENTER_NUM: i64 = 3;
const CENTER_DEN: i64 = 5;

/// Target rectangle for `zone` inside `work_area`.
pub fn compute_zone_rect(zone: SnapZone, work_area: Rect) -> Rect {
    let Rect {
        x: l,
        y: t,
        width: w,
        height: h,
    } = work_area;
    let (hw, hh) = (w / 2, h / 2);

    match zone {
        SnapZone::LeftHalf => Rect::new(l, t, hw, h),
        SnapZone::RightHalf => Rect::new(l + hw, t, hw, h),
        SnapZone::TopHalf => Rect::new(l, t, w, hh),
        SnapZone::BottomHalf => Rect::new(l, t + hh, w, hh),
        SnapZone::TopLeft => Rect::new(l, t, hw, hh),
        SnapZone::TopRight => Rect::new(l + hw, t, hw, hh),
        SnapZone::BottomLeft => Rect::new(l, t + hh, hw, hh),
        SnapZone::BottomRight => Rect::new(l + hw, t + hh, hw, hh),
        SnapZone::Center => {
            let cw = scaled(w);
            let ch = scaled(h);
            Rect::new(l + (w - cw) / 2, t + (h - ch) / 2, cw, ch)
        }
        SnapZone::Maximize => work_area,
    }
}

/// `round(0.6 * v)` in integer arithmetic (half rounds up).
fn scaled(v: i32) -> i32 {
    let v = i64::from(v);
    ((v * CENTER_NUM * 2 + CENTER_DEN) / (CENTER_DEN * 2)) as i32
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;

    fn work_areas() -> Vec<Rect> {
        vec![
            Rect::new(0, 0, 1920, 1080),
            Rect::new(0, 32, 2560, 1408),
            Rect::new(1920, 0, 1080, 1920),
            Rect::new(-1280, 100, 1279, 1023),
            Rect::new(5, 7, 1, 1),
            Rect::new(0, 0, 1366, 745),
        ]
    }

    #[test]
    fn top_right_on_full_hd() {
        let r = compute_zone_rect(SnapZone::TopRight, Rect::new(0, 0, 1920, 1080));
        assert_eq!(r, Rect::new(960, 0, 960, 540));
    }

    #[test]
    fn maximize_is_identity() {
        for wa in work_areas() {
            assert_eq!(compute_zone_rect(SnapZone::Maximize, wa), wa);
        }
    }

    #[test]
    fn halves_partition_width_within_one_pixel() {
        for wa in work_areas() {
            let left = compute_zone_rect(SnapZone::LeftHalf, wa);
            let right = compute_zone_rect(SnapZone::RightHalf, wa);
            assert_eq!(left.x, wa.x);
            // no overlap
            assert!(left.x + left.width <= right.x);
            let covered = left.width + right.width;
            assert!(wa.width - covered <= 1, "gap too large for {:?}", wa);
            assert!(right.x + right.width <= wa.x + wa.width);
        }
    }

    #[test]
    fn vertical_halves_partition_height_within_one_pixel() {
        for wa in work_areas() {
            let top = compute_zone_rect(SnapZone::TopHalf, wa);
            let bottom = compute_zone_rect(SnapZone::BottomHalf, wa);
            assert!(top.y + top.height <= bottom.y);
            assert!(wa.height - (top.height + bottom.height) <= 1);
            assert_eq!(top.width, wa.width);
        }
    }

    #[test]
    fn center_is_sixty_percent_and_centered() {
        for wa in work_areas() {
            let c = compute_zone_rect(SnapZone::Center, wa);
            assert_eq!(c.width, (0.6 * wa.width as f64).round() as i32);
            assert_eq!(c.height, (0.6 * wa.height as f64).round() as i32);
            let left_margin = c.x - wa.x;
            let right_margin = (wa.x + wa.width) - (c.x + c.width);
            assert!((left_margin - right_margin).abs() <= 1);
            let top_margin = c.y - wa.y;
            let bottom_margin = (wa.y + wa.height) - (c.y + c.height);
            assert!((top_margin - bottom_margin).abs() <= 1);
        }
    }

    #[test]
    fn quarters_tile_the_work_area() {
        let wa = Rect::new(100, 50, 1600, 900);
        assert_eq!(compute_zone_rect(SnapZone::TopLeft, wa), Rect::new(100, 50, 800, 450));
        assert_eq!(compute_zone_rect(SnapZone::BottomLeft, wa), Rect::new(100, 500, 800, 450));
        assert_eq!(compute_zone_rect(SnapZone::BottomRight, wa), Rect::new(900, 500, 800, 450));
    }

    #[test]
    fn every_zone_stays_inside_work_area() {
        for wa in work_areas() {
            for zone in SnapZone::ALL {
                let r = compute_zone_rect(zone, wa);
                assert!(r.x >= wa.x && r.y >= wa.y, "{:?} {:?}", zone, wa);
                assert!(r.x + r.width <= wa.x + wa.width, "{:?} {:?}", zone, wa);
                assert!(r.y + r.height <= wa.y + wa.height, "{:?} {:?}", zone, wa);
            }
        }
    }
}
