// SPDX-License-Identifier: MIT OR Apache-2.0
//! Flattening tagged sections into the canonical map.

use jdp_core::{CanonicalMap, Section};

/// Build the zone-keyed canonical map.
///
/// Document order is preserved: per section, prose lines first, then list
/// items list by list; sections contribute in sequence. Zones appear only
/// when they receive at least one line.
pub fn build_canonical_map(sections: &[Section]) -> CanonicalMap {
    let mut map = CanonicalMap::new();
    for sec in sections {
        for line in &sec.lines {
            map.push(sec.zone, line.clone());
        }
        for list in &sec.lists {
            for item in list {
                map.push(sec.zone, item.clone());
            }
        }
    }
    map
}
