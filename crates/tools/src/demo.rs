use dashstream_common::{Color, GridPos, MaterialHandle, PrefabHandle};
use dashstream_models::{ItemIds, item};
use dashstream_path::{EndOfPath, PathError, VertexPath};
use dashstream_render::{Outline, OutlineMode};
use dashstream_stream::{ItemRole, LevelData, LevelRow, Prefab};
use dashstream_timeline::PortalFunction;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Distance covered by one demo section.
const SECTION_LENGTH: i32 = 64;

/// A level with everything needed to load it. Also the on-disk level file format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoLevel {
    pub level: LevelData,
    pub prefabs: Vec<Prefab>,
    pub path: VertexPath,
}

/// Gameplay role of a custom item id.
pub fn role_for(id: &str) -> ItemRole {
    match id {
        item::SPEED_PORTAL_NORMAL => ItemRole::Portal(PortalFunction::Speed(10.0)),
        item::SPEED_PORTAL_FAST => ItemRole::Portal(PortalFunction::Speed(14.0)),
        item::SPEED_PORTAL_SUPER => ItemRole::Portal(PortalFunction::Speed(18.0)),
        item::COLOR_TRIGGER => ItemRole::ColorChanger,
        item::FINISH_TRIGGER => ItemRole::Finish,
        _ if id.starts_with("3dash:portals/gravity/") => ItemRole::Portal(PortalFunction::Gravity),
        _ if id.starts_with("3dash:portals/size/") => ItemRole::Portal(PortalFunction::Size),
        _ if id.starts_with("3dash:portals/mode/") => ItemRole::Portal(PortalFunction::Mode),
        _ if id.starts_with("3dash:orbs/") => ItemRole::Orb,
        _ if id.starts_with("3dash:pads/") => ItemRole::Pad,
        _ => ItemRole::Plain,
    }
}

fn prefabs() -> Vec<Prefab> {
    (0..ItemIds::count(false))
        .filter_map(|i| ItemIds::get(false, i).map(|id| (i, id)))
        .map(|(i, id)| {
            let prefab = Prefab::new(PrefabHandle(i as u64), role_for(id))
                .with_materials([MaterialHandle(i as u64)]);
            if id == item::NORMAL_BLOCK || id == item::HALF_BLOCK {
                prefab.with_outline(Outline {
                    color: Color::BLACK,
                    mode: OutlineMode::OutlineVisible,
                    width: 3.0,
                })
            } else {
                prefab
            }
        })
        .collect()
}

/// Gently winding path, with a sharp turn every fourth section.
fn path(length: i32) -> Result<VertexPath, PathError> {
    let mut points = Vec::new();
    let mut heading = 0.0f32;
    let mut position = Vec3::ZERO;
    points.push(position);
    for step in 1..=(length / 8 + 1) {
        heading += if step % 32 == 0 { 0.6 } else { (step as f32 * 0.3).sin() * 0.05 };
        position += Vec3::new(heading.sin(), 0.0, heading.cos()) * 8.0;
        points.push(position);
    }
    VertexPath::new(points, Vec3::Y, EndOfPath::Stop)
}

/// Build a demo level of `sections` sections. Each section has a floor of
/// blocks, a half-block step, a slope, a grid block pillar, an orb, a pad and
/// a color trigger; speed portals alternate every other section.
pub fn demo_level(sections: usize) -> Result<DemoLevel, PathError> {
    let index = |id: &str| ItemIds::index(false, id).unwrap_or(0);
    let mut rows = Vec::new();
    let sections = sections.max(1) as i32;

    for s in 0..sections {
        let base = s * SECTION_LENGTH;
        for x in base..base + SECTION_LENGTH {
            for z in -1..=1 {
                rows.push(LevelRow::new(index(item::NORMAL_BLOCK), GridPos::new(x, -1, z), 0));
            }
        }
        rows.push(LevelRow::new(index(item::HALF_BLOCK), GridPos::new(base + 8, 0, 0), 0));
        rows.push(LevelRow::new(index(item::NORMAL_BLOCK), GridPos::new(base + 9, 0, 0), 0));
        rows.push(LevelRow::new(index(item::SLOPE), GridPos::new(base + 16, 0, 1), 0));
        for y in 0..3 {
            rows.push(LevelRow::new(index(item::GRID_BLOCK), GridPos::new(base + 24, y, -1), 0));
        }
        rows.push(LevelRow::new(index("3dash:orbs/yellow"), GridPos::new(base + 30, 2, 0), 0));
        rows.push(LevelRow::new(index("3dash:pads/yellow"), GridPos::new(base + 36, 0, 0), 90));
        rows.push(LevelRow::new(
            index(item::COLOR_TRIGGER),
            GridPos::new(base + 40, (s % 10) - 5, 0),
            (s * 45) % 360,
        ));
        let portal = if s % 2 == 0 {
            item::SPEED_PORTAL_FAST
        } else {
            item::SPEED_PORTAL_NORMAL
        };
        rows.push(LevelRow::new(index(portal), GridPos::new(base + 48, 0, 0), 0));
    }
    let end = sections * SECTION_LENGTH;
    rows.push(LevelRow::new(index(item::FINISH_TRIGGER), GridPos::new(end, 0, 0), 0));

    let path = path(end + 16)?;
    tracing::debug!(sections, rows = rows.len(), "demo level generated");
    Ok(DemoLevel {
        level: LevelData {
            scene_name: format!("Demo {sections}"),
            official: false,
            initial_speed: 10.0,
            rows,
        },
        prefabs: prefabs(),
        path,
    })
}
