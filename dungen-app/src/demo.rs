use std::sync::Arc;

use dungen_config::DemoConfig;
use dungen_core::{
    Door, DoorAccess, DungenGraph, Layout, Line, Room, RoomBlueprint, RoomDefinition, RoomId,
    RoomType, Vector2F,
};
use tracing::{debug, info};

use crate::errors::DemoError;

/// 演示布局的统计结果。
#[derive(Debug, Clone, PartialEq)]
pub struct DemoSummary {
    pub rooms: usize,
    pub connections: usize,
    pub doors: usize,
    pub width: f64,
    pub height: f64,
    pub total_collision: f64,
    pub total_contact: f64,
}

/// 构造一条链状房间图并把房间沿 x 轴依次排开，相邻房间无间隔时在共享墙上放门。
pub fn build_layout(config: &DemoConfig) -> Result<Layout, DemoError> {
    let (width, height) = (config.room_width, config.room_height);
    if width <= 0.0 || height <= 0.0 {
        return Err(DemoError::InvalidDimensions { width, height });
    }

    let blueprint = Arc::new(RoomBlueprint::rectangle("demo", width, height)?);
    let definition_for =
        |room_type| RoomDefinition::new([blueprint.clone()], room_type).map(Arc::new);
    let normal = definition_for(RoomType::Normal)?;
    let start = definition_for(RoomType::Start)?;
    let boss = definition_for(RoomType::Boss)?;

    let count = config.room_count;
    let mut graph = DungenGraph::new();
    for raw in 0..count {
        let definition = if raw == 0 {
            start.clone()
        } else if raw + 1 == count {
            boss.clone()
        } else {
            normal.clone()
        };
        graph.add_room(RoomId::new(raw), definition)?;
    }
    for raw in 1..count {
        graph.add_connection(RoomId::new(raw - 1), RoomId::new(raw))?;
    }
    let graph = Arc::new(graph);

    let step = width + config.spacing;
    let mut rooms: Vec<Room> = graph
        .vertex_ids()
        .enumerate()
        .map(|(index, id)| {
            let mut room = Room::with_position(blueprint.clone(), Vector2F::ZERO, Some(id));
            room.translate(Vector2F::new(step * index as f64, 0.0));
            room
        })
        .collect();

    if config.spacing == 0.0 {
        for (a, b) in graph.connections() {
            let (left, right) = (a.get() as usize, b.get() as usize);
            let x = step * left as f64 + width * 0.5;
            let wall = Line::new(
                Vector2F::new(x, height * 0.5),
                Vector2F::new(x, -height * 0.5),
            );
            rooms[left].add_door(Door::new(wall, b, DoorAccess::Open))?;
            let access = if right + 1 == rooms.len() {
                DoorAccess::Locked
            } else {
                DoorAccess::Open
            };
            rooms[right].add_door(Door::new(wall.reversed(), a, access))?;
            debug!(from = %a, to = %b, "placed door on shared wall");
        }
    } else {
        info!(spacing = config.spacing, "房间之间留有间隔，不放置门");
    }

    let mut layout = Layout::new(graph);
    for room in rooms {
        if let Some(id) = room.number() {
            layout.update(id, room)?;
        }
    }
    if config.snap_to_grid {
        layout.snap_to_grid();
    }
    Ok(layout)
}

pub fn summarize(layout: &Layout) -> DemoSummary {
    let rooms: Vec<&Room> = layout.rooms().map(|(_, room)| room).collect();
    let total_contact: f64 = rooms
        .windows(2)
        .map(|pair| Room::contact_area(pair[0], pair[1]))
        .sum();
    DemoSummary {
        rooms: rooms.len(),
        connections: layout.graph().connection_count(),
        doors: rooms.iter().map(|room| room.doors().len()).sum(),
        width: layout.width(),
        height: layout.height(),
        total_collision: layout.total_collision_area(),
        total_contact,
    }
}

/// 构建演示布局并打印概览。
pub fn run(config: &DemoConfig) -> Result<DemoSummary, DemoError> {
    let layout = build_layout(config)?;
    let summary = summarize(&layout);
    info!(
        rooms = summary.rooms,
        width = summary.width,
        height = summary.height,
        "演示布局完成"
    );

    println!("地牢布局演示");
    println!(
        "房间数={}, 连接数={}, 门数={}",
        summary.rooms, summary.connections, summary.doors
    );
    println!("整体尺寸={:.2} × {:.2}", summary.width, summary.height);
    println!(
        "重叠面积合计={:.3}, 墙体贴合长度合计={:.3}",
        summary.total_collision, summary.total_contact
    );

    println!("房间列表：");
    for (id, room) in layout.rooms() {
        let room_type = layout
            .graph()
            .definition(id)
            .map(|definition| definition.room_type());
        let center = room.center();
        println!(
            "  - 房间 {}, 类型={:?}, 中心=({:.2}, {:.2}), 门={}",
            id,
            room_type.unwrap_or_default(),
            center.x(),
            center.y(),
            room.doors().len()
        );
        for boundary in room.boundary().iter().filter(|b| b.is_door()) {
            let line = boundary.line;
            println!(
                "      门 ({:.1}, {:.1}) → ({:.1}, {:.1})",
                line.start.x(),
                line.start.y(),
                line.end.x(),
                line.end.y()
            );
        }
    }
    Ok(summary)
}
