//! The widget layout tree: zone → section → area.
//!
//! Nodes are created lazily the first time they are addressed. Each area
//! holds an ordered, duplicate-free list of widget ids. A widget id should
//! live in at most one area; the tree does not enforce this across areas,
//! so callers [`WidgetAlignSystem::find`] before adding.

use std::fmt;

use serde::{Deserialize, Serialize};
use terrascene_core::id::WidgetId;

/// The two layout zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneType {
    /// Inside the map viewport.
    #[default]
    Inner,
    /// Around the map viewport.
    Outer,
}

/// The three sections of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    /// Left column.
    #[default]
    Left,
    /// Center column.
    Center,
    /// Right column.
    Right,
}

/// The three areas of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaType {
    /// Top row.
    #[default]
    Top,
    /// Middle row.
    Middle,
    /// Bottom row.
    Bottom,
}

/// How widgets inside an area are aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetAlign {
    /// Packed to the start.
    #[default]
    Start,
    /// Centered.
    Centered,
    /// Packed to the end.
    End,
}

impl From<&str> for WidgetAlign {
    /// Unknown values fall back to [`WidgetAlign::Start`].
    fn from(value: &str) -> Self {
        match value {
            "centered" => Self::Centered,
            "end" => Self::End,
            _ => Self::Start,
        }
    }
}

/// Addresses one area of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WidgetLocation {
    /// Zone.
    pub zone: ZoneType,
    /// Section within the zone.
    pub section: SectionType,
    /// Area within the section.
    pub area: AreaType,
}

impl WidgetLocation {
    /// Builds a location.
    #[must_use]
    pub fn new(zone: ZoneType, section: SectionType, area: AreaType) -> Self {
        Self {
            zone,
            section,
            area,
        }
    }
}

impl WidgetLocation {
    /// Every location, zone by zone, then section, then area.
    pub fn all() -> impl Iterator<Item = Self> {
        [ZoneType::Inner, ZoneType::Outer].into_iter().flat_map(|zone| {
            [SectionType::Left, SectionType::Center, SectionType::Right]
                .into_iter()
                .flat_map(move |section| {
                    [AreaType::Top, AreaType::Middle, AreaType::Bottom]
                        .into_iter()
                        .map(move |area| Self::new(zone, section, area))
                })
        })
    }
}

impl fmt::Display for WidgetLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:?}/{:?}", self.zone, self.section, self.area)
    }
}

/// Resolves an insertion index: negative or past-the-end means append.
fn insertion_index(index: isize, len: usize) -> usize {
    usize::try_from(index).map_or(len, |i| i.min(len))
}

/// An ordered list of widget ids plus an alignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetArea {
    widget_ids: Vec<WidgetId>,
    align: WidgetAlign,
}

impl WidgetArea {
    /// Builds an area; duplicate ids are dropped.
    #[must_use]
    pub fn new(ids: impl IntoIterator<Item = WidgetId>, align: WidgetAlign) -> Self {
        let mut area = Self {
            widget_ids: Vec::new(),
            align,
        };
        for id in ids {
            area.add(id, -1);
        }
        area
    }

    /// Widget ids in order.
    #[must_use]
    pub fn widget_ids(&self) -> &[WidgetId] {
        &self.widget_ids
    }

    /// Alignment.
    #[must_use]
    pub fn align(&self) -> WidgetAlign {
        self.align
    }

    /// Changes the alignment.
    pub fn set_align(&mut self, align: WidgetAlign) {
        self.align = align;
    }

    /// Position of `id` in this area.
    #[must_use]
    pub fn find(&self, id: WidgetId) -> Option<usize> {
        self.widget_ids.iter().position(|w| *w == id)
    }

    /// Inserts `id` at `index` (negative or out of range appends). Ignored if
    /// the area already holds `id`.
    pub fn add(&mut self, id: WidgetId, index: isize) {
        if self.find(id).is_some() {
            return;
        }
        let at = insertion_index(index, self.widget_ids.len());
        self.widget_ids.insert(at, id);
    }

    /// Removes `id`. Returns whether it was present.
    pub fn remove(&mut self, id: WidgetId) -> bool {
        match self.find(id) {
            Some(i) => {
                self.widget_ids.remove(i);
                true
            }
            None => false,
        }
    }

    /// Moves `id` to `index` within this area. Ignored if absent.
    pub fn move_to(&mut self, id: WidgetId, index: isize) {
        if self.remove(id) {
            let at = insertion_index(index, self.widget_ids.len());
            self.widget_ids.insert(at, id);
        }
    }
}

/// The top, middle, and bottom areas of a section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    top: Option<WidgetArea>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    middle: Option<WidgetArea>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bottom: Option<WidgetArea>,
}

impl WidgetSection {
    fn slot(&self, area: AreaType) -> &Option<WidgetArea> {
        match area {
            AreaType::Top => &self.top,
            AreaType::Middle => &self.middle,
            AreaType::Bottom => &self.bottom,
        }
    }

    fn slot_mut(&mut self, area: AreaType) -> &mut Option<WidgetArea> {
        match area {
            AreaType::Top => &mut self.top,
            AreaType::Middle => &mut self.middle,
            AreaType::Bottom => &mut self.bottom,
        }
    }

    /// The area, created if missing.
    pub fn area(&mut self, area: AreaType) -> &mut WidgetArea {
        self.slot_mut(area).get_or_insert_with(WidgetArea::default)
    }

    /// The area, if it was ever created.
    #[must_use]
    pub fn area_ref(&self, area: AreaType) -> Option<&WidgetArea> {
        self.slot(area).as_ref()
    }

    /// Finds `id` in any area of this section.
    #[must_use]
    pub fn find(&self, id: WidgetId) -> Option<(usize, AreaType)> {
        [AreaType::Top, AreaType::Middle, AreaType::Bottom]
            .into_iter()
            .find_map(|a| self.area_ref(a)?.find(id).map(|i| (i, a)))
    }

    /// Removes `id` from the first area holding it.
    pub fn remove(&mut self, id: WidgetId) -> bool {
        [AreaType::Top, AreaType::Middle, AreaType::Bottom]
            .into_iter()
            .any(|a| self.slot_mut(a).as_mut().is_some_and(|area| area.remove(id)))
    }
}

/// The left, center, and right sections of a zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetZone {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    left: Option<WidgetSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    center: Option<WidgetSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    right: Option<WidgetSection>,
}

impl WidgetZone {
    fn slot(&self, section: SectionType) -> &Option<WidgetSection> {
        match section {
            SectionType::Left => &self.left,
            SectionType::Center => &self.center,
            SectionType::Right => &self.right,
        }
    }

    fn slot_mut(&mut self, section: SectionType) -> &mut Option<WidgetSection> {
        match section {
            SectionType::Left => &mut self.left,
            SectionType::Center => &mut self.center,
            SectionType::Right => &mut self.right,
        }
    }

    /// The section, created if missing.
    pub fn section(&mut self, section: SectionType) -> &mut WidgetSection {
        self.slot_mut(section)
            .get_or_insert_with(WidgetSection::default)
    }

    /// The section, if it was ever created.
    #[must_use]
    pub fn section_ref(&self, section: SectionType) -> Option<&WidgetSection> {
        self.slot(section).as_ref()
    }

    /// Finds `id` in any section of this zone.
    #[must_use]
    pub fn find(&self, id: WidgetId) -> Option<(usize, SectionType, AreaType)> {
        [SectionType::Left, SectionType::Center, SectionType::Right]
            .into_iter()
            .find_map(|s| {
                let (index, area) = self.section_ref(s)?.find(id)?;
                Some((index, s, area))
            })
    }

    /// Removes `id` from the first area holding it.
    pub fn remove(&mut self, id: WidgetId) -> bool {
        [SectionType::Left, SectionType::Center, SectionType::Right]
            .into_iter()
            .any(|s| {
                self.slot_mut(s)
                    .as_mut()
                    .is_some_and(|section| section.remove(id))
            })
    }
}

/// The whole widget layout of a scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetAlignSystem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inner: Option<WidgetZone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    outer: Option<WidgetZone>,
}

impl WidgetAlignSystem {
    /// An empty layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, zone: ZoneType) -> &mut Option<WidgetZone> {
        match zone {
            ZoneType::Inner => &mut self.inner,
            ZoneType::Outer => &mut self.outer,
        }
    }

    /// The zone, created if missing.
    pub fn zone(&mut self, zone: ZoneType) -> &mut WidgetZone {
        self.slot_mut(zone).get_or_insert_with(WidgetZone::default)
    }

    /// The zone, if it was ever created.
    #[must_use]
    pub fn zone_ref(&self, zone: ZoneType) -> Option<&WidgetZone> {
        match zone {
            ZoneType::Inner => self.inner.as_ref(),
            ZoneType::Outer => self.outer.as_ref(),
        }
    }

    /// The area at `location`, creating every missing node on the way.
    pub fn area(&mut self, location: WidgetLocation) -> &mut WidgetArea {
        self.zone(location.zone)
            .section(location.section)
            .area(location.area)
    }

    /// The area at `location`, if it exists.
    #[must_use]
    pub fn area_ref(&self, location: WidgetLocation) -> Option<&WidgetArea> {
        self.zone_ref(location.zone)?
            .section_ref(location.section)?
            .area_ref(location.area)
    }

    /// Where `id` is placed: its index within its area and the area's
    /// location.
    #[must_use]
    pub fn find(&self, id: WidgetId) -> Option<(usize, WidgetLocation)> {
        [ZoneType::Inner, ZoneType::Outer]
            .into_iter()
            .find_map(|z| {
                let (index, section, area) = self.zone_ref(z)?.find(id)?;
                Some((index, WidgetLocation::new(z, section, area)))
            })
    }

    /// Removes `id` from the first area holding it.
    pub fn remove(&mut self, id: WidgetId) -> bool {
        [ZoneType::Inner, ZoneType::Outer]
            .into_iter()
            .any(|z| self.slot_mut(z).as_mut().is_some_and(|zone| zone.remove(id)))
    }

    /// Moves a placed widget.
    ///
    /// Within its own area this reorders; otherwise it leaves its area and
    /// is inserted into the area at `location`. Negative or out-of-range
    /// indexes append. Ignored if `id` is not placed anywhere.
    pub fn move_widget(&mut self, id: WidgetId, location: WidgetLocation, index: isize) {
        let Some((_, current)) = self.find(id) else {
            return;
        };
        if current == location {
            self.area(location).move_to(id, index);
            return;
        }
        self.area(current).remove(id);
        self.area(location).add(id, index);
    }

    /// Every placed widget id, zone by zone.
    #[must_use]
    pub fn widget_ids(&self) -> Vec<WidgetId> {
        WidgetLocation::all()
            .filter_map(|location| self.area_ref(location))
            .flat_map(|area| area.widget_ids().iter().copied())
            .collect()
    }
}
