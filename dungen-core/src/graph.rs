use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::blueprint::RoomDefinition;
use crate::errors::GraphError;

/// 图顶点（房间）标识。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(u32);

impl RoomId {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for RoomId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

#[derive(Debug, Clone)]
pub struct Vertex {
    id: RoomId,
    definition: Arc<RoomDefinition>,
    neighbours: Vec<usize>,
}

impl Vertex {
    #[inline]
    pub fn id(&self) -> RoomId {
        self.id
    }

    #[inline]
    pub fn definition(&self) -> &Arc<RoomDefinition> {
        &self.definition
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.neighbours.len()
    }
}

/// 房间连通图：布局生成的输入。
///
/// 顶点存放在按插入顺序排列的槽位中，`index` 把房间 ID 映射到槽位，边以槽位对表示。
#[derive(Debug, Clone, Default)]
pub struct DungenGraph {
    vertices: Vec<Vertex>,
    index: HashMap<RoomId, usize>,
    connections: Vec<(usize, usize)>,
}

impl DungenGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_room(
        &mut self,
        id: RoomId,
        definition: Arc<RoomDefinition>,
    ) -> Result<(), GraphError> {
        if self.index.contains_key(&id) {
            return Err(GraphError::DuplicateRoom(id));
        }
        let slot = self.vertices.len();
        self.vertices.push(Vertex {
            id,
            definition,
            neighbours: Vec::new(),
        });
        self.index.insert(id, slot);
        debug!(room = %id, slot, "registered room");
        Ok(())
    }

    /// 注册一条无向边，两端必须是已注册的不同房间。
    pub fn add_connection(&mut self, a: RoomId, b: RoomId) -> Result<(), GraphError> {
        let slot_a = self.slot(a)?;
        let slot_b = self.slot(b)?;
        if slot_a == slot_b {
            return Err(GraphError::SelfConnection(a));
        }
        if self.vertices[slot_a].neighbours.contains(&slot_b) {
            return Err(GraphError::DuplicateConnection(a, b));
        }

        self.vertices[slot_a].neighbours.push(slot_b);
        self.vertices[slot_b].neighbours.push(slot_a);
        self.connections.push((slot_a, slot_b));
        debug!(from = %a, to = %b, "registered connection");
        Ok(())
    }

    /// 按注册顺序遍历顶点。
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter()
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = RoomId> + '_ {
        self.vertices.iter().map(Vertex::id)
    }

    pub fn connections(&self) -> impl Iterator<Item = (RoomId, RoomId)> + '_ {
        self.connections
            .iter()
            .map(|&(a, b)| (self.vertices[a].id, self.vertices[b].id))
    }

    pub fn neighbours(&self, id: RoomId) -> Result<impl Iterator<Item = RoomId> + '_, GraphError> {
        let slot = self.slot(id)?;
        Ok(self.vertices[slot]
            .neighbours
            .iter()
            .map(|&n| self.vertices[n].id))
    }

    pub fn vertex(&self, id: RoomId) -> Option<&Vertex> {
        self.index.get(&id).map(|&slot| &self.vertices[slot])
    }

    pub fn definition(&self, id: RoomId) -> Option<&Arc<RoomDefinition>> {
        self.vertex(id).map(Vertex::definition)
    }

    #[inline]
    pub fn contains(&self, id: RoomId) -> bool {
        self.index.contains_key(&id)
    }

    #[inline]
    pub fn room_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// 所有房间是否互相可达。空图视为连通。
    pub fn is_connected(&self) -> bool {
        if self.vertices.is_empty() {
            return true;
        }
        let mut visited = vec![false; self.vertices.len()];
        let mut queue = VecDeque::from([0usize]);
        visited[0] = true;
        let mut reached = 1;
        while let Some(slot) = queue.pop_front() {
            for &next in &self.vertices[slot].neighbours {
                if !visited[next] {
                    visited[next] = true;
                    reached += 1;
                    queue.push_back(next);
                }
            }
        }
        reached == self.vertices.len()
    }

    fn slot(&self, id: RoomId) -> Result<usize, GraphError> {
        self.index
            .get(&id)
            .copied()
            .ok_or(GraphError::UnknownRoom(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::{RoomBlueprint, RoomType};

    fn definition() -> Arc<RoomDefinition> {
        let blueprint = Arc::new(RoomBlueprint::rectangle("room", 20.0, 10.0).unwrap());
        Arc::new(RoomDefinition::new([blueprint], RoomType::Normal).unwrap())
    }

    #[test]
    fn rooms_and_connections_are_registered_in_order() {
        let def = definition();
        let mut graph = DungenGraph::new();
        graph.add_room(RoomId::new(2), def.clone()).unwrap();
        graph.add_room(RoomId::new(0), def.clone()).unwrap();
        graph.add_room(RoomId::new(1), def).unwrap();
        graph.add_connection(RoomId::new(2), RoomId::new(0)).unwrap();
        graph.add_connection(RoomId::new(0), RoomId::new(1)).unwrap();

        let ids: Vec<u32> = graph.vertex_ids().map(RoomId::get).collect();
        assert_eq!(ids, vec![2, 0, 1]);
        assert_eq!(graph.connection_count(), 2);
        let neighbours: Vec<_> = graph.neighbours(RoomId::new(0)).unwrap().collect();
        assert_eq!(neighbours, vec![RoomId::new(2), RoomId::new(1)]);
        assert_eq!(graph.vertex(RoomId::new(0)).map(Vertex::degree), Some(2));
        assert!(graph.is_connected());
        assert_eq!(
            graph.definition(RoomId::new(1)).map(|d| d.room_type()),
            Some(RoomType::Normal)
        );
    }

    #[test]
    fn duplicate_room_is_rejected() {
        let mut graph = DungenGraph::new();
        graph.add_room(RoomId::new(0), definition()).unwrap();
        assert_eq!(
            graph.add_room(RoomId::new(0), definition()),
            Err(GraphError::DuplicateRoom(RoomId::new(0)))
        );
        assert_eq!(graph.room_count(), 1);
    }

    #[test]
    fn connection_to_unknown_room_is_rejected() {
        let mut graph = DungenGraph::new();
        graph.add_room(RoomId::new(0), definition()).unwrap();
        assert_eq!(
            graph.add_connection(RoomId::new(0), RoomId::new(7)),
            Err(GraphError::UnknownRoom(RoomId::new(7)))
        );
        assert_eq!(
            graph.add_connection(RoomId::new(0), RoomId::new(0)),
            Err(GraphError::SelfConnection(RoomId::new(0)))
        );
        assert_eq!(graph.connection_count(), 0);
        assert!(graph.neighbours(RoomId::new(9)).is_err());
    }

    #[test]
    fn duplicate_connection_is_rejected_in_either_direction() {
        let mut graph = DungenGraph::new();
        graph.add_room(RoomId::new(0), definition()).unwrap();
        graph.add_room(RoomId::new(1), definition()).unwrap();
        graph.add_connection(RoomId::new(0), RoomId::new(1)).unwrap();
        assert_eq!(
            graph.add_connection(RoomId::new(1), RoomId::new(0)),
            Err(GraphError::DuplicateConnection(RoomId::new(1), RoomId::new(0)))
        );
    }

    #[test]
    fn disconnected_graph_is_detected() {
        let mut graph = DungenGraph::new();
        for id in 0..3 {
            graph.add_room(RoomId::new(id), definition()).unwrap();
        }
        graph.add_connection(RoomId::new(0), RoomId::new(1)).unwrap();
        assert!(!graph.is_connected());
        graph.add_connection(RoomId::new(1), RoomId::new(2)).unwrap();
        assert!(graph.is_connected());
    }
}
