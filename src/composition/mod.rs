//! Item registry and map-to-picture change propagation.
//!
//! A [`Composition`] owns every map and picture. Pictures refer to their
//! rotation map by [`ItemId`]; the link is a lookup into the registry, so a
//! removed map simply stops resolving. Each map has a change topic holding
//! the pictures linked to it, and the composition rewires subscriptions when
//! a picture's link changes. Every mutation has reached all affected pictures
//! when the setter returns; renderers pick up the resulting
//! [`PictureEvent`]s with [`Composition::drain_events`].

mod event;

pub use event::PictureEvent;

use crate::fit::{Anchor, FitConfig, ResizeFitter, ResizeMode};
use crate::geo::{BuiltinTransform, Crs, Extent, GeoTransform};
use crate::geometry::{NaturalSize, Rect};
use crate::item::{ItemId, ItemKind, MapItem, MapUpdate, PictureItem, PictureSource, Refit};
use crate::north::TrueNorthCalculator;
use crate::probe::ImageProbe;
use crate::sync::{NorthMode, SyncOutcome};
use crate::trace::{trace_event, trace_span};
use crate::util::{Condition, NorthFitError, NorthFitResult};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Layout container for maps and pictures.
pub struct Composition {
    geo: Box<dyn GeoTransform>,
    north: TrueNorthCalculator,
    fit_config: FitConfig,
    next_id: u64,
    maps: BTreeMap<ItemId, MapItem>,
    pictures: BTreeMap<ItemId, PictureItem>,
    topics: HashMap<ItemId, BTreeSet<ItemId>>,
    events: Vec<PictureEvent>,
}

impl Default for Composition {
    fn default() -> Self {
        Self::new(BuiltinTransform::new())
    }
}

impl Composition {
    /// Creates an empty composition using `geo` for coordinate transforms.
    pub fn new(geo: impl GeoTransform + 'static) -> Self {
        Self {
            geo: Box::new(geo),
            north: TrueNorthCalculator::default(),
            fit_config: FitConfig::default(),
            next_id: 1,
            maps: BTreeMap::new(),
            pictures: BTreeMap::new(),
            topics: HashMap::new(),
            events: Vec::new(),
        }
    }

    /// Replaces the true north calculator used for `TrueNorth` pictures.
    pub fn with_true_north(mut self, north: TrueNorthCalculator) -> Self {
        self.north = north;
        self
    }

    /// Fit configuration given to new pictures.
    pub fn default_fit_config(&self) -> &FitConfig {
        &self.fit_config
    }

    pub fn geo_transform(&self) -> &dyn GeoTransform {
        &*self.geo
    }

    fn allocate_id(&mut self) -> ItemId {
        let id = ItemId::new(self.next_id);
        self.next_id += 1;
        id
    }

    // ---- maps ----

    /// Adds a map and returns its id.
    pub fn add_map(
        &mut self,
        extent: Extent,
        crs: Crs,
        rotation_deg: f64,
    ) -> NorthFitResult<ItemId> {
        check_rotation(rotation_deg)?;
        let id = self.allocate_id();
        self.maps.insert(id, MapItem::new(id, extent, crs, rotation_deg));
        Ok(id)
    }

    /// Removes a map and its change topic. Linked pictures keep the link,
    /// which no longer resolves; their rotation falls back to the offset.
    pub fn remove_map(&mut self, id: ItemId) -> NorthFitResult<MapItem> {
        let map = self.maps.remove(&id).ok_or(unknown_map(id))?;
        self.propagate(id);
        self.topics.remove(&id);
        Ok(map)
    }

    pub fn map(&self, id: ItemId) -> Option<&MapItem> {
        self.maps.get(&id)
    }

    pub fn maps(&self) -> impl Iterator<Item = &MapItem> {
        self.maps.values()
    }

    /// Pictures subscribed to changes of `map`, in id order.
    pub fn linked_pictures(&self, map: ItemId) -> Vec<ItemId> {
        self.topics
            .get(&map)
            .map(|subscribers| subscribers.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn set_map_extent(&mut self, id: ItemId, extent: Extent) -> NorthFitResult<()> {
        self.update_map(id, MapUpdate::new().extent(extent))
    }

    pub fn set_map_crs(&mut self, id: ItemId, crs: Crs) -> NorthFitResult<()> {
        self.update_map(id, MapUpdate::new().crs(crs))
    }

    pub fn set_map_rotation(&mut self, id: ItemId, rotation_deg: f64) -> NorthFitResult<()> {
        self.update_map(id, MapUpdate::new().rotation_deg(rotation_deg))
    }

    /// Applies several map changes, then propagates once.
    pub fn update_map(&mut self, id: ItemId, update: MapUpdate) -> NorthFitResult<()> {
        if let Some(rotation_deg) = update.rotation_deg {
            check_rotation(rotation_deg)?;
        }
        let map = self.maps.get_mut(&id).ok_or(unknown_map(id))?;
        map.apply(&update);
        self.propagate(id);
        Ok(())
    }

    fn propagate(&mut self, map: ItemId) {
        let subscribers = self.linked_pictures(map);
        let _span = trace_span!("propagate", map = map.get(), pictures = subscribers.len()).entered();
        for picture in subscribers {
            self.sync_picture(picture);
        }
    }

    // ---- pictures ----

    /// Adds a picture with `frame` and returns its id. New pictures use
    /// `Zoom` and north mode `None`.
    pub fn add_picture(&mut self, frame: Rect) -> NorthFitResult<ItemId> {
        check_rect(frame)?;
        let fitter = ResizeFitter::new(self.fit_config)?;
        let id = self.allocate_id();
        self.pictures.insert(id, PictureItem::new(id, frame, fitter));
        Ok(id)
    }

    /// Removes a picture and its subscription.
    pub fn remove_picture(&mut self, id: ItemId) -> NorthFitResult<PictureItem> {
        let picture = self.pictures.remove(&id).ok_or(unknown_picture(id))?;
        if let Some(map) = picture.synchronizer().link() {
            self.unsubscribe(map, id);
        }
        Ok(picture)
    }

    pub fn picture(&self, id: ItemId) -> Option<&PictureItem> {
        self.pictures.get(&id)
    }

    pub fn pictures(&self) -> impl Iterator<Item = &PictureItem> {
        self.pictures.values()
    }

    /// The picture's rotation map if the link resolves.
    pub fn rotation_map(&self, picture: ItemId) -> NorthFitResult<Option<ItemId>> {
        let picture = self.pictures.get(&picture).ok_or(unknown_picture(picture))?;
        Ok(picture
            .synchronizer()
            .link()
            .filter(|map| self.maps.contains_key(map)))
    }

    /// Sets the image source. The natural size is cleared until reported
    /// again with [`set_natural_size`](Self::set_natural_size) or
    /// [`load_natural_size`](Self::load_natural_size).
    pub fn set_picture_source(
        &mut self,
        id: ItemId,
        source: Option<PictureSource>,
    ) -> NorthFitResult<()> {
        self.edit_picture(id, true, |p| {
            p.set_source(source);
            Ok(())
        })
    }

    pub fn set_natural_size(&mut self, id: ItemId, natural: NaturalSize) -> NorthFitResult<()> {
        self.edit_picture(id, false, |p| {
            p.set_natural_size(Some(natural));
            Ok(())
        })
    }

    /// Asks `probe` for the natural size of the picture's source.
    pub fn load_natural_size(
        &mut self,
        id: ItemId,
        probe: &dyn ImageProbe,
    ) -> NorthFitResult<NaturalSize> {
        let picture = self.pictures.get(&id).ok_or(unknown_picture(id))?;
        let source = picture
            .source()
            .ok_or(NorthFitError::InvalidInput("picture has no source"))?;
        let natural = probe.natural_size(source)?;
        self.set_natural_size(id, natural)?;
        Ok(natural)
    }

    pub fn set_frame(&mut self, id: ItemId, frame: Rect) -> NorthFitResult<()> {
        check_rect(frame)?;
        self.edit_picture(id, false, |p| {
            p.set_frame(frame);
            Ok(())
        })
    }

    pub fn set_frame_enabled(&mut self, id: ItemId, enabled: bool) -> NorthFitResult<()> {
        let picture = self.pictures.get_mut(&id).ok_or(unknown_picture(id))?;
        if picture.set_frame_enabled(enabled) {
            self.events.push(PictureEvent::Repainted { picture: id });
        }
        Ok(())
    }

    pub fn set_resize_mode(&mut self, id: ItemId, mode: ResizeMode) -> NorthFitResult<()> {
        self.edit_picture(id, false, |p| {
            p.set_resize_mode(mode);
            Ok(())
        })
    }

    pub fn set_anchor(&mut self, id: ItemId, anchor: Anchor) -> NorthFitResult<()> {
        self.edit_picture(id, false, |p| {
            let cfg = p.fit_config().with_anchor(anchor);
            p.set_fit_config(cfg)
        })
    }

    pub fn set_fit_config(&mut self, id: ItemId, cfg: FitConfig) -> NorthFitResult<()> {
        self.edit_picture(id, false, |p| p.set_fit_config(cfg))
    }

    /// Sets the fit configuration of every picture (and of pictures added
    /// later), then refits them all.
    pub fn set_fit_config_all(&mut self, cfg: FitConfig) -> NorthFitResult<()> {
        cfg.validate()?;
        self.fit_config = cfg;
        for picture in self.pictures.values_mut() {
            picture.set_fit_config(cfg)?;
        }
        self.refit_all();
        Ok(())
    }

    /// Recomputes the displayed rect of every picture.
    pub fn refit_all(&mut self) {
        let _span = trace_span!("refit_all", pictures = self.pictures.len()).entered();
        #[cfg(feature = "rayon")]
        let refits: Vec<(ItemId, Refit)> = {
            use rayon::prelude::*;
            self.pictures
                .par_iter_mut()
                .map(|(id, picture)| (*id, picture.refit()))
                .collect()
        };
        #[cfg(not(feature = "rayon"))]
        let refits: Vec<(ItemId, Refit)> = self
            .pictures
            .iter_mut()
            .map(|(id, picture)| (*id, picture.refit()))
            .collect();

        for (id, refit) in refits {
            if let Some(picture) = self.pictures.get(&id) {
                publish(&mut self.events, picture, SyncOutcome::default(), refit, false);
            }
        }
    }

    pub fn set_north_mode(&mut self, id: ItemId, mode: NorthMode) -> NorthFitResult<()> {
        let picture = self.pictures.get_mut(&id).ok_or(unknown_picture(id))?;
        picture.sync_mut().set_mode(mode);
        self.sync_picture(id);
        Ok(())
    }

    /// Links the picture to `map` (or unlinks it with `None`) and rewires
    /// its change subscription. The north mode is kept. Linking to an id
    /// that is not a map in this composition fails with
    /// [`NorthFitError::UnknownItem`].
    pub fn set_rotation_map(&mut self, id: ItemId, map: Option<ItemId>) -> NorthFitResult<()> {
        if let Some(map) = map {
            if !self.maps.contains_key(&map) {
                return Err(unknown_map(map));
            }
        }
        let picture = self.pictures.get_mut(&id).ok_or(unknown_picture(id))?;
        let previous = picture.sync_mut().set_link(map);
        if previous != map {
            if let Some(old) = previous {
                self.unsubscribe(old, id);
            }
            if let Some(new) = map {
                self.topics.entry(new).or_default().insert(id);
            }
        }
        self.sync_picture(id);
        Ok(())
    }

    pub fn set_north_offset(&mut self, id: ItemId, offset_deg: f64) -> NorthFitResult<()> {
        let picture = self.pictures.get_mut(&id).ok_or(unknown_picture(id))?;
        picture.sync_mut().set_offset_deg(offset_deg)?;
        self.sync_picture(id);
        Ok(())
    }

    /// Sets the rotation of a picture whose rotation is free. Fails with
    /// [`NorthFitError::RotationLocked`] while it follows a map.
    pub fn set_picture_rotation(&mut self, id: ItemId, rotation_deg: f64) -> NorthFitResult<()> {
        let picture = self.pictures.get_mut(&id).ok_or(unknown_picture(id))?;
        let previous_deg = picture.rotation_deg();
        let rotation_changed = picture.sync_mut().set_free_rotation(rotation_deg)?;
        let sync = SyncOutcome {
            rotation_changed,
            condition: None,
        };
        let refit = if rotation_changed {
            picture.refit_rotation(previous_deg)
        } else {
            Refit::default()
        };
        publish(&mut self.events, picture, sync, refit, false);
        Ok(())
    }

    /// Takes the events emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<PictureEvent> {
        std::mem::take(&mut self.events)
    }

    fn unsubscribe(&mut self, map: ItemId, picture: ItemId) {
        if let Some(subscribers) = self.topics.get_mut(&map) {
            subscribers.remove(&picture);
            if subscribers.is_empty() {
                self.topics.remove(&map);
            }
        }
    }

    /// Applies `edit` to a picture and refits it.
    fn edit_picture<F>(&mut self, id: ItemId, repaint: bool, edit: F) -> NorthFitResult<()>
    where
        F: FnOnce(&mut PictureItem) -> NorthFitResult<()>,
    {
        let picture = self.pictures.get_mut(&id).ok_or(unknown_picture(id))?;
        edit(picture)?;
        let refit = picture.refit();
        publish(&mut self.events, picture, SyncOutcome::default(), refit, repaint);
        Ok(())
    }

    /// Re-derives the rotation of one picture from its linked map.
    fn sync_picture(&mut self, id: ItemId) {
        let Some(picture) = self.pictures.get_mut(&id) else {
            return;
        };
        let map = picture.synchronizer().link().and_then(|m| self.maps.get(&m));
        let previous_deg = picture.rotation_deg();
        let sync = picture.sync_mut().resolve(map, &self.north, &*self.geo);
        let refit = if sync.rotation_changed {
            picture.refit_rotation(previous_deg)
        } else {
            Refit::default()
        };
        trace_event!(
            "picture_synced",
            picture = id.get(),
            rotation = picture.rotation_deg()
        );
        publish(&mut self.events, picture, sync, refit, false);
    }
}

/// Appends the events for one picture update.
fn publish(
    events: &mut Vec<PictureEvent>,
    picture: &PictureItem,
    sync: SyncOutcome,
    refit: Refit,
    repaint: bool,
) {
    let id = picture.id();
    if let Some(condition) = sync.condition {
        events.push(PictureEvent::Condition {
            picture: id,
            condition,
        });
    }
    if sync.rotation_changed {
        events.push(PictureEvent::RotationChanged {
            picture: id,
            rotation_deg: picture.rotation_deg(),
        });
    }
    if refit.frame_changed {
        events.push(PictureEvent::FrameResized {
            picture: id,
            frame: picture.frame(),
        });
    }
    if refit.degenerate && (refit.displayed_changed || refit.frame_changed || repaint) {
        events.push(PictureEvent::Condition {
            picture: id,
            condition: Condition::DegenerateGeometry,
        });
    }
    if repaint || sync.rotation_changed || refit.displayed_changed || refit.frame_changed {
        events.push(PictureEvent::Repainted { picture: id });
    }
}

fn unknown_map(id: ItemId) -> NorthFitError {
    NorthFitError::UnknownItem {
        id,
        kind: ItemKind::Map,
    }
}

fn unknown_picture(id: ItemId) -> NorthFitError {
    NorthFitError::UnknownItem {
        id,
        kind: ItemKind::Picture,
    }
}

fn check_rotation(rotation_deg: f64) -> NorthFitResult<()> {
    if rotation_deg.is_finite() {
        Ok(())
    } else {
        Err(NorthFitError::InvalidInput("rotation must be finite"))
    }
}

fn check_rect(rect: Rect) -> NorthFitResult<()> {
    if rect.is_finite() {
        Ok(())
    } else {
        Err(NorthFitError::InvalidInput("frame must be finite"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_never_reused() {
        let mut c = Composition::default();
        let a = c.add_map(Extent::default(), Crs::WGS84, 0.0).unwrap();
        c.remove_map(a).unwrap();
        let b = c.add_map(Extent::default(), Crs::WGS84, 0.0).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn relinking_moves_subscription() {
        let mut c = Composition::default();
        let m1 = c.add_map(Extent::default(), Crs::WGS84, 0.0).unwrap();
        let m2 = c.add_map(Extent::default(), Crs::WGS84, 0.0).unwrap();
        let p = c.add_picture(Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        c.set_rotation_map(p, Some(m1)).unwrap();
        assert_eq!(c.linked_pictures(m1), vec![p]);
        c.set_rotation_map(p, Some(m2)).unwrap();
        assert!(c.linked_pictures(m1).is_empty());
        assert_eq!(c.linked_pictures(m2), vec![p]);
        c.remove_picture(p).unwrap();
        assert!(c.linked_pictures(m2).is_empty());
        assert!(c.topics.is_empty());
    }

    #[test]
    fn removed_map_drops_its_topic() {
        let mut c = Composition::default();
        let m = c.add_map(Extent::default(), Crs::WGS84, 0.0).unwrap();
        let p = c.add_picture(Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        c.set_rotation_map(p, Some(m)).unwrap();
        c.remove_map(m).unwrap();
        assert!(c.topics.is_empty());
        assert_eq!(c.picture(p).unwrap().synchronizer().link(), Some(m));

        let other = c.add_map(Extent::default(), Crs::WGS84, 0.0).unwrap();
        c.set_rotation_map(p, Some(other)).unwrap();
        assert_eq!(c.topics.len(), 1);
        assert_eq!(c.linked_pictures(other), vec![p]);
    }

    #[test]
    fn links_must_name_live_maps() {
        let mut c = Composition::default();
        let p = c.add_picture(Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        let m = c.add_map(Extent::default(), Crs::WGS84, 0.0).unwrap();
        for target in [ItemId::new(99), p] {
            assert_eq!(
                c.set_rotation_map(p, Some(target)),
                Err(NorthFitError::UnknownItem {
                    id: target,
                    kind: ItemKind::Map
                })
            );
        }
        c.remove_map(m).unwrap();
        assert!(c.set_rotation_map(p, Some(m)).is_err());
        assert_eq!(c.picture(p).unwrap().synchronizer().link(), None);
        assert!(c.topics.is_empty());
    }

    #[test]
    fn unknown_items_are_errors() {
        let mut c = Composition::default();
        let ghost = ItemId::new(99);
        assert_eq!(
            c.set_map_rotation(ghost, 1.0),
            Err(NorthFitError::UnknownItem {
                id: ghost,
                kind: ItemKind::Map
            })
        );
        assert_eq!(
            c.set_resize_mode(ghost, ResizeMode::Clip),
            Err(NorthFitError::UnknownItem {
                id: ghost,
                kind: ItemKind::Picture
            })
        );
    }

    #[test]
    fn frame_style_change_repaints_once() {
        let mut c = Composition::default();
        let p = c.add_picture(Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        c.set_frame_enabled(p, true).unwrap();
        c.set_frame_enabled(p, true).unwrap();
        assert_eq!(c.drain_events(), vec![PictureEvent::Repainted { picture: p }]);
    }
}
