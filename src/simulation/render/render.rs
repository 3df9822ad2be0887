use crate::spatial::chunks::MergedDirtyRects;

use super::Simulation;

pub(super) fn collect_dirty_rects(sim: &mut Simulation) -> &MergedDirtyRects {
    sim.chunks.collect_dirty_rects(&mut sim.merged_rects);
    sim.chunks.clear_render_dirty();
    &sim.merged_rects
}
