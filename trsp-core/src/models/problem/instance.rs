#[cfg(test)]
#[path = "../../../tests/unit/models/problem/instance_test.rs"]
mod instance_test;

use crate::algorithms::structures::BitVec;
use crate::models::common::{Duration, Location, NodeId, TimeWindow, Timestamp};
use rustc_hash::FxHashMap;

/// Specifies a role of the node within the instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// The main depot where tools and spare parts can be replenished.
    MainDepot,
    /// A technician's home, a start of the technician's tour.
    Home {
        /// Technician index.
        technician: usize,
    },
    /// A service request.
    Request,
    /// A copy of technician's home which marks the end of the tour.
    HomeDuplicate {
        /// Technician index.
        technician: usize,
    },
    /// A copy of the main depot which is used to visit the main depot within the technician's tour.
    MainDepotDuplicate {
        /// Technician index.
        technician: usize,
    },
}

/// Represents a node: a depot or a service request.
#[derive(Clone, Debug)]
pub struct Node {
    /// A node id.
    pub id: NodeId,
    /// A node role.
    pub kind: NodeKind,
    /// A user defined name.
    pub name: String,
    /// A node location.
    pub location: Location,
    /// A time window when service can start.
    pub time_window: TimeWindow,
    /// A service duration.
    pub service_time: Duration,
    /// Skills required to serve the node.
    pub skills: BitVec,
    /// Tools required to serve the node.
    pub tools: BitVec,
    /// Amount of spare parts of each type consumed at the node.
    pub spare_parts: Vec<i32>,
    /// Whether the request is released and should be served.
    pub released: bool,
}

/// Represents a technician.
#[derive(Clone, Debug)]
pub struct Technician {
    /// A technician index.
    pub id: usize,
    /// A user defined name.
    pub name: String,
    /// A home node id, the start of the tour.
    pub home: NodeId,
    /// A home duplicate node id, the end of the tour.
    pub home_duplicate: NodeId,
    /// A node id which has to be used to visit the main depot.
    pub main_depot_duplicate: NodeId,
    /// A travel speed: travel time is the distance divided by the speed.
    pub speed: f64,
    /// Skills of the technician.
    pub skills: BitVec,
    /// Tools carried at the start of the tour.
    pub tools: BitVec,
    /// Spare parts carried at the start of the tour.
    pub spare_parts: Vec<i32>,
}

/// Specifies sizes of resource dimensions used by the instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResourceDimensions {
    /// Amount of distinct skills.
    pub skills: usize,
    /// Amount of distinct tools.
    pub tools: usize,
    /// Amount of spare part types.
    pub spare_parts: usize,
}

/// Keeps compatibility of a technician with every node.
#[derive(Clone, Debug)]
pub(crate) struct Compatibility {
    pub skills: BitVec,
    pub tools: BitVec,
    pub spare_parts: BitVec,
    pub full: BitVec,
}

/// Represents an immutable technician routing problem: nodes, fleet and preprocessed compatibility data.
pub struct Instance {
    pub(crate) nodes: Vec<Node>,
    pub(crate) technicians: Vec<Technician>,
    pub(crate) requests: Vec<NodeId>,
    pub(crate) dimensions: ResourceDimensions,
    pub(crate) distances: Vec<f64>,
    pub(crate) arc_feasibility: BitVec,
    pub(crate) compatibility: Vec<Compatibility>,
    pub(crate) compatible_technicians: Vec<Vec<usize>>,
    pub(crate) names: FxHashMap<String, NodeId>,
}

impl Instance {
    /// Returns the size of the node id space: every node id is lower than this value.
    pub fn max_id(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the main depot node id.
    pub fn main_depot(&self) -> NodeId {
        0
    }

    /// Returns node by its id.
    pub fn node(&self, node: NodeId) -> &Node {
        &self.nodes[node]
    }

    /// Returns node id by its user defined name.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Returns all technicians.
    pub fn technicians(&self) -> &[Technician] {
        self.technicians.as_slice()
    }

    /// Returns technician by index.
    pub fn technician(&self, technician: usize) -> &Technician {
        &self.technicians[technician]
    }

    /// Returns amount of technicians.
    pub fn fleet_size(&self) -> usize {
        self.technicians.len()
    }

    /// Returns request ids in ascending order.
    pub fn requests(&self) -> &[NodeId] {
        self.requests.as_slice()
    }

    /// Returns ids of released requests in ascending order.
    pub fn released_requests(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.requests.iter().copied().filter(|&request| self.nodes[request].released)
    }

    /// Returns resource dimensions.
    pub fn dimensions(&self) -> ResourceDimensions {
        self.dimensions
    }

    /// Checks whether the node is a request.
    pub fn is_request(&self, node: NodeId) -> bool {
        matches!(self.nodes[node].kind, NodeKind::Request)
    }

    /// Checks whether the node is a depot of any kind.
    pub fn is_depot(&self, node: NodeId) -> bool {
        !self.is_request(node)
    }

    /// Checks whether the node is the main depot or one of its duplicates.
    pub fn is_main_depot(&self, node: NodeId) -> bool {
        matches!(self.nodes[node].kind, NodeKind::MainDepot | NodeKind::MainDepotDuplicate { .. })
    }

    /// Checks whether the node is a technician's home or home duplicate.
    pub fn is_home(&self, node: NodeId) -> bool {
        matches!(self.nodes[node].kind, NodeKind::Home { .. } | NodeKind::HomeDuplicate { .. })
    }

    /// Returns node's time window.
    pub fn time_window(&self, node: NodeId) -> &TimeWindow {
        &self.nodes[node].time_window
    }

    /// Returns node's service time.
    pub fn service_time(&self, node: NodeId) -> Duration {
        self.nodes[node].service_time
    }

    /// Returns distance between two nodes.
    pub fn distance(&self, from: NodeId, to: NodeId) -> f64 {
        self.distances[from * self.max_id() + to]
    }

    /// Returns travel time between two nodes for given technician.
    pub fn travel_time(&self, from: NodeId, to: NodeId, technician: usize) -> Duration {
        self.distance(from, to) / self.technicians[technician].speed
    }

    /// Calculates arrival time at `node` when departing from `pred` which was reached at `pred_arrival`.
    pub fn arrival_time(&self, node: NodeId, pred: NodeId, pred_arrival: Timestamp, technician: usize) -> Timestamp {
        self.time_window(pred).earliest_start_of_service(pred_arrival)
            + self.service_time(pred)
            + self.travel_time(pred, node, technician)
    }

    /// Checks whether going from one node to another can respect time windows with the fastest technician.
    pub fn is_arc_feasible(&self, from: NodeId, to: NodeId) -> bool {
        self.arc_feasibility[from * self.max_id() + to]
    }

    /// Checks whether technician has all the skills required by the node.
    pub fn is_skill_compatible(&self, technician: usize, node: NodeId) -> bool {
        self.compatibility[technician].skills[node]
    }

    /// Checks whether technician carries all the tools required by the node from the start.
    pub fn is_tool_compatible(&self, technician: usize, node: NodeId) -> bool {
        self.compatibility[technician].tools[node]
    }

    /// Checks whether technician carries enough spare parts for the node from the start.
    pub fn is_spare_part_compatible(&self, technician: usize, node: NodeId) -> bool {
        self.compatibility[technician].spare_parts[node]
    }

    /// Checks whether technician has the skills and can reach the node within time windows,
    /// going through the main depot when tools or spare parts are lacking.
    pub fn is_compatible(&self, technician: usize, node: NodeId) -> bool {
        self.compatibility[technician].full[node]
    }

    /// Returns technicians which are compatible with the node.
    pub fn compatible_technicians(&self, node: NodeId) -> &[usize] {
        self.compatible_technicians[node].as_slice()
    }

    /// Checks whether the technician has all tools required by the node.
    pub fn has_required_tools(&self, technician: usize, node: NodeId) -> bool {
        self.nodes[node].tools.is_subset(&self.technicians[technician].tools)
    }

    /// Returns amount of spare parts of given type required by the node.
    pub fn spare_part_requirement(&self, node: NodeId, part: usize) -> i32 {
        self.nodes[node].spare_parts.get(part).copied().unwrap_or(0)
    }
}

/// Computes arc feasibility graph using the fastest travel speed.
pub(crate) fn create_arc_feasibility(nodes: &[Node], distances: &[f64], max_speed: f64) -> BitVec {
    let size = nodes.len();
    let mut arcs = BitVec::new(size * size);

    for (i, from) in nodes.iter().enumerate() {
        for (j, to) in nodes.iter().enumerate() {
            let arrival = from.time_window.start + from.service_time + distances[i * size + j] / max_speed;
            arcs.set(i * size + j, i != j && to.time_window.is_feasible(arrival));
        }
    }

    arcs
}

/// Computes compatibility of every technician with every node.
pub(crate) fn create_compatibility(instance: &Instance) -> Vec<Compatibility> {
    instance
        .technicians
        .iter()
        .map(|technician| {
            let size = instance.max_id();
            let mut compatibility = Compatibility {
                skills: BitVec::new(size),
                tools: BitVec::new(size),
                spare_parts: BitVec::new(size),
                full: BitVec::new(size),
            };

            for node in instance.nodes.iter() {
                let (skills, tools, spare_parts, full) = match node.kind {
                    NodeKind::Request => {
                        let skills = node.skills.is_subset(&technician.skills);
                        let tools = node.tools.is_subset(&technician.tools);
                        let spare_parts =
                            node.spare_parts.iter().zip(technician.spare_parts.iter()).all(|(req, has)| req <= has);
                        let full = skills && is_reachable(instance, technician, node.id, !tools || !spare_parts);

                        (skills, tools, spare_parts, full)
                    }
                    NodeKind::Home { technician: owner }
                    | NodeKind::HomeDuplicate { technician: owner }
                    | NodeKind::MainDepotDuplicate { technician: owner } => {
                        let is_own = owner == technician.id;
                        (is_own, is_own, is_own, is_own)
                    }
                    NodeKind::MainDepot => (true, true, true, true),
                };

                compatibility.skills.set(node.id, skills);
                compatibility.tools.set(node.id, tools);
                compatibility.spare_parts.set(node.id, spare_parts);
                compatibility.full.set(node.id, full);
            }

            compatibility
        })
        .collect()
}

fn is_reachable(instance: &Instance, technician: &Technician, request: NodeId, via_depot: bool) -> bool {
    let mut node = technician.home;
    let mut arrival = instance.time_window(node).start;

    let path = via_depot.then_some(technician.main_depot_duplicate).into_iter().chain(std::iter::once(request));
    for next in path {
        arrival = instance.arrival_time(next, node, arrival, technician.id);
        if !instance.time_window(next).is_feasible(arrival) {
            return false;
        }
        node = next;
    }

    let back = instance.arrival_time(technician.home_duplicate, node, arrival, technician.id);
    instance.time_window(technician.home_duplicate).is_feasible(back)
}
