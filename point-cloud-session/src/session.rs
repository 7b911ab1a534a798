use std::sync::Arc;
use std::time::Instant;

use point_cloud_ingest::{LasHeader, LoadOptions, LoadSummary, PointCloudData, ProgressSink};

use crate::debounce::{Debouncer, Pending};
use crate::error::{Result, SessionError};
use crate::settings::SessionSettings;
use crate::slicing::{Axis, SliceEngine, SliceState, SliceView};
use crate::surface::RenderSurface;

/// Identifies one load request. Only the newest ticket may install its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Everything one viewer needs: the loaded cloud, slicing, rotation and
/// presentation settings. Operations take the session explicitly; there is
/// no ambient state.
#[derive(Debug)]
pub struct Session {
    settings: SessionSettings,
    cloud: Option<PointCloudData>,
    slicing: SliceEngine,
    rotation: f64,
    colour_override: Option<[f32; 3]>,
    debouncer: Debouncer,
    load_generation: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}

impl Session {
    pub fn new(settings: SessionSettings) -> Self {
        let debouncer = Debouncer::new(settings.debounce());
        Self {
            settings,
            cloud: None,
            slicing: SliceEngine::new(&[], 0.0),
            rotation: 0.0,
            colour_override: None,
            debouncer,
            load_generation: 0,
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn cloud(&self) -> Option<&PointCloudData> {
        self.cloud.as_ref()
    }

    pub fn header(&self) -> Option<&LasHeader> {
        self.cloud.as_ref().map(|cloud| &cloud.header)
    }

    pub fn summary(&self) -> Option<&LoadSummary> {
        self.cloud.as_ref().map(|cloud| &cloud.summary)
    }

    // Loading

    /// Start a load. Any earlier ticket still outstanding becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_generation += 1;
        LoadTicket(self.load_generation)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.load_generation
    }

    /// Install the outcome of a load.
    ///
    /// Results for superseded tickets are discarded. A failed load leaves the
    /// previous cloud in place. A successful one replaces it wholesale and
    /// resets slicing.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: point_cloud_ingest::Result<PointCloudData>,
    ) -> Result<()> {
        if !self.is_current(ticket) {
            log::debug!(
                "Discarding load {} (current is {})",
                ticket.0,
                self.load_generation
            );
            return Err(SessionError::Superseded {
                ticket: ticket.0,
                current: self.load_generation,
            });
        }
        let cloud = result?;
        log::info!("Session now holds {} points", cloud.len());
        self.slicing = SliceEngine::new(&cloud.positions, self.rotation);
        self.debouncer.cancel();
        self.cloud = Some(cloud);
        Ok(())
    }

    /// Decode `bytes` and install the result.
    pub fn load(
        &mut self,
        bytes: Vec<u8>,
        options: LoadOptions,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<()> {
        let ticket = self.begin_load();
        let result = point_cloud_ingest::load(bytes, options, progress);
        self.finish_load(ticket, result)
    }

    // View parameters

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Rotate the cloud about the up axis. World bounds follow immediately.
    pub fn set_rotation(&mut self, angle_rad: f64) {
        self.rotation = angle_rad;
        if let Some(cloud) = &self.cloud {
            self.slicing.update_rotation(&cloud.positions, angle_rad);
        }
    }

    pub fn colour_override(&self) -> Option<[f32; 3]> {
        self.colour_override
    }

    pub fn set_colour_override(&mut self, colour: Option<[f32; 3]>) {
        self.colour_override = colour;
    }

    pub fn set_point_size(&mut self, size: f32) {
        self.settings.point_size = size.max(0.0);
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.settings.opacity = opacity.clamp(0.0, 1.0);
    }

    // Slicing

    pub fn slicing(&self) -> &SliceEngine {
        &self.slicing
    }

    pub fn slice_state(&self) -> &SliceState {
        self.slicing.state()
    }

    pub fn enable_slicing(&mut self) {
        self.slicing.enable();
    }

    /// Turn slicing off, putting the full cloud back on `surface` if the
    /// filtered view showed fewer points.
    pub fn disable_slicing(&mut self, surface: &mut dyn RenderSurface) -> bool {
        self.debouncer.cancel();
        if self.slicing.disable() != SliceView::Original {
            return false;
        }
        if let Some(cloud) = &self.cloud {
            surface.set_buffers(&cloud.positions, &cloud.colours);
        }
        true
    }

    pub fn set_slice_range(&mut self, axis: Axis, min: f64, max: f64) {
        self.slicing.set_range(axis, min, max);
    }

    pub fn set_slice_min(&mut self, axis: Axis, value: f64) {
        self.slicing.set_min(axis, value);
    }

    pub fn set_slice_max(&mut self, axis: Axis, value: f64) {
        self.slicing.set_max(axis, value);
    }

    pub fn displayed_count(&self) -> usize {
        self.slicing.displayed_count()
    }

    // Recompute scheduling

    /// Queue a recompute after the quiet period if the slice inputs changed.
    /// Returns the request that now supersedes any earlier one.
    pub fn request_recompute(&mut self, now: Instant) -> Option<Pending> {
        if self.cloud.is_none() || !self.slicing.is_stale(self.rotation, self.colour_override) {
            return None;
        }
        Some(self.debouncer.request(now))
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.pending().map(|pending| pending.due)
    }

    /// Run the recompute for `generation` if it is still the newest request.
    pub fn fire_if_current(&mut self, generation: u64, surface: &mut dyn RenderSurface) -> bool {
        self.debouncer.fire_if_current(generation) && self.recompute_now(surface)
    }

    /// Run the pending recompute if its deadline has passed.
    pub fn poll(&mut self, now: Instant, surface: &mut dyn RenderSurface) -> bool {
        self.debouncer.take_due(now).is_some() && self.recompute_now(surface)
    }

    /// Recompute immediately, bypassing the debounce.
    pub fn recompute_now(&mut self, surface: &mut dyn RenderSurface) -> bool {
        let Some(cloud) = &self.cloud else {
            return false;
        };
        let view = self.slicing.recompute(
            &cloud.positions,
            &cloud.colours,
            self.rotation,
            self.colour_override,
        );
        match (view, self.slicing.filtered()) {
            (SliceView::Filtered, Some(filtered)) => {
                surface.set_buffers(&filtered.positions, &filtered.colours);
                true
            }
            _ => false,
        }
    }

    // Presentation

    /// Push point size, opacity and rotation.
    pub fn apply_view(&self, surface: &mut dyn RenderSurface) {
        surface.set_point_size(self.settings.point_size);
        surface.set_opacity(self.settings.opacity);
        surface.set_rotation(self.rotation);
    }

    /// Push the full presentation state, including whichever buffers are on show.
    pub fn apply(&self, surface: &mut dyn RenderSurface) {
        self.apply_view(surface);
        let Some(cloud) = &self.cloud else {
            return;
        };
        match self.slicing.filtered() {
            Some(filtered) if self.slicing.is_enabled() => {
                surface.set_buffers(&filtered.positions, &filtered.colours)
            }
            _ => surface.set_buffers(&cloud.positions, &cloud.colours),
        }
    }
}
