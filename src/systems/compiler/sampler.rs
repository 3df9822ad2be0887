use crate::domain::rules::Sampler;

/// Offsets before range checking, plus group start indices for ordered
/// samplers (one past the last group appended).
pub(super) struct Expanded {
    pub offsets: Vec<(i32, i32)>,
    pub groups: Option<Vec<usize>>,
}

pub(super) fn expand(sampler: &Sampler) -> Expanded {
    let mut offsets = Vec::new();
    let mut groups = None;

    match sampler {
        Sampler::Own => offsets.push((0, 0)),

        Sampler::Offsets { offsets: list } => {
            offsets.extend(list.iter().map(|&(dx, dy)| (dx as i32, dy as i32)));
        }

        Sampler::Radius { radius, up_bias } => {
            let r = *radius as i32;
            for dy in -r..=r {
                for dx in -r..=r {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let copies = if dy < 0 { 1 + *up_bias as usize } else { 1 };
                    for _ in 0..copies {
                        offsets.push((dx, dy));
                    }
                }
            }
        }

        Sampler::Annulus { inner, outer } => {
            let (inner2, outer2) = ((*inner as i32).pow(2), (*outer as i32).pow(2));
            let r = *outer as i32;
            for dy in -r..=r {
                for dx in -r..=r {
                    let d2 = dx * dx + dy * dy;
                    if d2 > inner2 && d2 <= outer2 {
                        offsets.push((dx, dy));
                    }
                }
            }
        }

        Sampler::Rect { left, right, up, down } => {
            for dy in -(*up as i32)..=(*down as i32) {
                for dx in -(*left as i32)..=(*right as i32) {
                    if dx != 0 || dy != 0 {
                        offsets.push((dx, dy));
                    }
                }
            }
        }

        Sampler::Ordered { groups: list } => {
            let mut starts = Vec::with_capacity(list.len() + 1);
            for group in list {
                starts.push(offsets.len());
                offsets.extend(group.iter().map(|&(dx, dy)| (dx as i32, dy as i32)));
            }
            starts.push(offsets.len());
            groups = Some(starts);
        }
    }

    Expanded { offsets, groups }
}
