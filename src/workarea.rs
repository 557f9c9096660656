//! Work-area computation.
//!
//! A work area is a rectangle (a monitor, or the whole screen) shrunk by
//! the largest strut reservation on each side. A strut counts only when
//! its rectangle intersects the area on both axes; overlapping the area's
//! span on the strut's own axis is not enough, so a left panel on one
//! monitor never eats into the monitor beside it.

use crate::types::{Rect, Side, StrutSpec};

/// Smallest usable width/height a work area is allowed to shrink to
pub const MIN_SANE_AREA: u32 = 100;

/// Pixels reserved on each side of an area
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reserved {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

/// Accumulate the maximum reservation per side over all struts whose
/// rectangle intersects `area` on both axes. Each amount is measured
/// from the area's edge and clamped to the area's extent.
pub fn reserved_space<'a>(area: Rect, struts: impl IntoIterator<Item = &'a StrutSpec>) -> Reserved {
    let mut reserved = Reserved::default();

    for spec in struts {
        for (side, strut) in spec.iter() {
            if !strut.intersects(&area) {
                continue;
            }

            match side {
                Side::Left => {
                    let amount = (strut.right() - area.x).clamp(0, area.width as i32) as u32;
                    reserved.left = reserved.left.max(amount);
                }
                Side::Right => {
                    let amount = (area.right() - strut.x).clamp(0, area.width as i32) as u32;
                    reserved.right = reserved.right.max(amount);
                }
                Side::Top => {
                    let amount = (strut.bottom() - area.y).clamp(0, area.height as i32) as u32;
                    reserved.top = reserved.top.max(amount);
                }
                Side::Bottom => {
                    let amount = (area.bottom() - strut.y).clamp(0, area.height as i32) as u32;
                    reserved.bottom = reserved.bottom.max(amount);
                }
            }
        }
    }

    reserved
}

/// Keep at least `min_sane` (or the whole extent, if smaller) usable.
/// The shortfall is handed back evenly from both sides.
fn clamp_pair(near: u32, far: u32, extent: u32, min_sane: u32) -> (u32, u32) {
    let allowed = extent - min_sane.min(extent);
    let total = near as u64 + far as u64;
    if total <= allowed as u64 {
        return (near, far);
    }

    let excess = (total - allowed as u64) as u32;
    let mut give_near = excess / 2;
    let mut give_far = excess - give_near;

    if give_near > near {
        give_far += give_near - near;
        give_near = near;
    }
    if give_far > far {
        give_near += give_far - far;
        give_far = far;
    }

    (near - give_near, far - give_far)
}

/// Apply the sanity clamp to a reservation on `area`
pub fn sanitize(area: Rect, reserved: Reserved, min_sane: u32) -> Reserved {
    let (left, right) = clamp_pair(reserved.left, reserved.right, area.width, min_sane);
    let (top, bottom) = clamp_pair(reserved.top, reserved.bottom, area.height, min_sane);

    let sane = Reserved { left, right, top, bottom };
    if sane != reserved {
        log::warn!(
            "Struts occupy an unusually large part of {}x{}+{}+{}; clamped {:?} to {:?}",
            area.width,
            area.height,
            area.x,
            area.y,
            reserved,
            sane
        );
    }
    sane
}

/// The usable part of `area` once `struts` are subtracted
pub fn compute_work_area<'a>(
    area: Rect,
    struts: impl IntoIterator<Item = &'a StrutSpec>,
    min_sane: u32,
) -> Rect {
    let reserved = sanitize(area, reserved_space(area, struts), min_sane);

    Rect::new(
        area.x + reserved.left as i32,
        area.y + reserved.top as i32,
        area.width - reserved.left - reserved.right,
        area.height - reserved.top - reserved.bottom,
    )
}
