use scene::{EntityId, SceneDocument};

use crate::manifest::{HotspotEntry, ManifestError, RoomEntry, TourManifest};

/// Builds the tour markup described by `manifest` into a fresh document.
///
/// Layout follows the page conventions the controllers rely on:
/// - `a-scene > a-sky#skybox` carries the entry room's background.
/// - each room gets `#<id>-hotspots` (visible only for the entry room),
///   optional `#<id>-guide.guide[data-location]` wrapping an
///   `[animation-mixer]` model, and optional `#<id>-explanation`.
/// - panels are `.info-panel` / `.explanation-panel` entities, hidden.
pub fn build_document(manifest: &TourManifest) -> Result<SceneDocument, ManifestError> {
    manifest.validate()?;

    let mut doc = SceneDocument::new();
    let scene = doc.append(None, "a-scene", &[]);

    let entry = manifest
        .room(&manifest.entry_room)
        .ok_or_else(|| ManifestError::UnknownEntryRoom {
            id: manifest.entry_room.clone(),
        })?;
    let entry_bg = entry.background_ref();
    doc.append(Some(scene), "a-sky", &[("id", "skybox"), ("src", entry_bg.as_str())]);

    for room in &manifest.rooms {
        spawn_room(&mut doc, scene, room, room.id == manifest.entry_room);
    }

    if manifest.home_button {
        doc.append(
            Some(scene),
            "a-entity",
            &[
                ("id", "home-button"),
                ("class", "clickable"),
                ("data-target", manifest.entry_room.as_str()),
                ("data-target-img", entry_bg.as_str()),
                ("visible", "false"),
            ],
        );
    }

    if manifest.booking_confirmation {
        let panel = doc.append(
            Some(scene),
            "a-entity",
            &[("id", "booking-confirmation"), ("visible", "false")],
        );
        doc.append(Some(panel), "a-text", &[("id", "booking-text"), ("value", "")]);
        doc.append(
            Some(panel),
            "a-entity",
            &[("class", "clickable"), ("data-action", "close-booking")],
        );
    }

    if manifest.desktop_controls {
        for id in ["booking-button", "info-button", "lobby-button", "guide-button"] {
            doc.append(None, "button", &[("id", id)]);
        }
    }

    Ok(doc)
}

fn spawn_room(doc: &mut SceneDocument, scene: EntityId, room: &RoomEntry, is_entry: bool) {
    let group_id = format!("{}-hotspots", room.id);
    let group = doc.append(
        Some(scene),
        "a-entity",
        &[
            ("id", group_id.as_str()),
            ("visible", if is_entry { "true" } else { "false" }),
        ],
    );
    for hotspot in &room.hotspots {
        match hotspot {
            HotspotEntry::Navigate { target, target_img } => {
                let img = target_img.clone().unwrap_or_else(|| format!("#{target}"));
                doc.append(
                    Some(group),
                    "a-entity",
                    &[
                        ("class", "clickable"),
                        ("data-target", target.as_str()),
                        ("data-target-img", img.as_str()),
                    ],
                );
            }
            HotspotEntry::Info { panel } => {
                doc.append(
                    Some(group),
                    "a-entity",
                    &[("class", "clickable"), ("data-info", panel.as_str())],
                );
            }
        }
    }

    if let Some(guide) = &room.guide {
        let guide_id = format!("{}-guide", room.id);
        let location = guide.location.clone().unwrap_or_else(|| room.id.clone());
        let el = doc.append(
            Some(scene),
            "a-entity",
            &[
                ("id", guide_id.as_str()),
                ("class", "guide"),
                ("data-location", location.as_str()),
                ("visible", if is_entry { "true" } else { "false" }),
            ],
        );
        if guide.animated {
            doc.append(
                Some(el),
                "a-entity",
                &[
                    ("gltf-model", "#guide-model"),
                    ("animation-mixer", "clip: idle"),
                    ("visible", "false"),
                ],
            );
        }
        doc.append(Some(el), "a-text", &[("value", "Ask me!"), ("visible", "false")]);
    }

    if room.explanation {
        let id = format!("{}-explanation", room.id);
        let panel = doc.append(
            Some(scene),
            "a-entity",
            &[("id", id.as_str()), ("class", "explanation-panel"), ("visible", "false")],
        );
        doc.append(
            Some(panel),
            "a-entity",
            &[("class", "clickable"), ("data-action", "close-explanation")],
        );
    }

    for p in &room.panels {
        let panel = doc.append(
            Some(scene),
            "a-entity",
            &[("id", p.id.as_str()), ("class", "info-panel"), ("visible", "false")],
        );
        doc.append(
            Some(panel),
            "a-entity",
            &[("class", "clickable"), ("data-action", "close-panel")],
        );
        if p.bookable {
            doc.append(
                Some(panel),
                "a-entity",
                &[("class", "clickable"), ("data-action", "book-room")],
            );
        }
    }
}
