//! Provides a way to build an [Instance] using the builder pattern.

#[cfg(test)]
#[path = "../../../tests/unit/models/problem/builders_test.rs"]
mod builders_test;

use super::instance::{create_arc_feasibility, create_compatibility};
use crate::algorithms::structures::BitVec;
use crate::models::common::{Duration, Location, NodeId, TimeWindow};
use crate::models::problem::{Instance, Node, NodeKind, ResourceDimensions, Technician};
use crate::utils::{GenericError, GenericResult, InfoLogger};
use rustc_hash::{FxHashMap, FxHashSet};

/// Specifies what to do with a request which no technician can serve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnservablePolicy {
    /// Instance construction fails.
    #[default]
    Reject,
    /// A warning is logged and the request stays in the instance.
    Warn,
}

/// Provides a way to describe a [Technician].
#[derive(Clone, Debug)]
pub struct TechnicianBuilder {
    name: String,
    home: Location,
    shift: TimeWindow,
    speed: f64,
    skills: Vec<usize>,
    tools: Vec<usize>,
    spare_parts: Vec<i32>,
}

impl TechnicianBuilder {
    /// Creates a new instance of `TechnicianBuilder` with given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            home: Location::default(),
            shift: TimeWindow::max(),
            speed: 1.,
            skills: vec![],
            tools: vec![],
            spare_parts: vec![],
        }
    }

    /// Sets home location.
    pub fn home(mut self, location: Location) -> Self {
        self.home = location;
        self
    }

    /// Sets working shift: the tour starts at home not earlier than shift start and returns home before shift end.
    pub fn shift(mut self, shift: TimeWindow) -> Self {
        self.shift = shift;
        self
    }

    /// Sets travel speed.
    pub fn speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Sets skill indices.
    pub fn skills(mut self, skills: &[usize]) -> Self {
        self.skills = skills.to_vec();
        self
    }

    /// Sets tool indices.
    pub fn tools(mut self, tools: &[usize]) -> Self {
        self.tools = tools.to_vec();
        self
    }

    /// Sets initial amount of spare parts per type.
    pub fn spare_parts(mut self, spare_parts: &[i32]) -> Self {
        self.spare_parts = spare_parts.to_vec();
        self
    }
}

/// Provides a way to describe a service request.
#[derive(Clone, Debug)]
pub struct RequestBuilder {
    name: String,
    location: Location,
    time_window: TimeWindow,
    service_time: Duration,
    skills: Vec<usize>,
    tools: Vec<usize>,
    spare_parts: Vec<i32>,
    released: bool,
}

impl RequestBuilder {
    /// Creates a new instance of `RequestBuilder` with given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            location: Location::default(),
            time_window: TimeWindow::max(),
            service_time: 0.,
            skills: vec![],
            tools: vec![],
            spare_parts: vec![],
            released: true,
        }
    }

    /// Sets request location.
    pub fn location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Sets time window.
    pub fn time_window(mut self, time_window: TimeWindow) -> Self {
        self.time_window = time_window;
        self
    }

    /// Sets service time.
    pub fn service_time(mut self, service_time: Duration) -> Self {
        self.service_time = service_time;
        self
    }

    /// Sets required skill indices.
    pub fn skills(mut self, skills: &[usize]) -> Self {
        self.skills = skills.to_vec();
        self
    }

    /// Sets required tool indices.
    pub fn tools(mut self, tools: &[usize]) -> Self {
        self.tools = tools.to_vec();
        self
    }

    /// Sets required amount of spare parts per type.
    pub fn spare_parts(mut self, spare_parts: &[i32]) -> Self {
        self.spare_parts = spare_parts.to_vec();
        self
    }

    /// Sets whether the request is released.
    pub fn released(mut self, released: bool) -> Self {
        self.released = released;
        self
    }
}

/// Provides a way to build an [Instance].
pub struct InstanceBuilder {
    depot: Location,
    depot_time_window: TimeWindow,
    dimensions: ResourceDimensions,
    technicians: Vec<TechnicianBuilder>,
    requests: Vec<RequestBuilder>,
    policy: UnservablePolicy,
    logger: Option<InfoLogger>,
}

impl Default for InstanceBuilder {
    fn default() -> Self {
        Self {
            depot: Location::default(),
            depot_time_window: TimeWindow::max(),
            dimensions: ResourceDimensions::default(),
            technicians: vec![],
            requests: vec![],
            policy: UnservablePolicy::default(),
            logger: None,
        }
    }
}

impl InstanceBuilder {
    /// Sets main depot location and its opening hours.
    pub fn main_depot(mut self, location: Location, time_window: TimeWindow) -> Self {
        self.depot = location;
        self.depot_time_window = time_window;
        self
    }

    /// Sets resource dimensions: amount of skills, tools and spare part types.
    pub fn dimensions(mut self, dimensions: ResourceDimensions) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Adds a technician.
    pub fn add_technician(mut self, technician: TechnicianBuilder) -> Self {
        self.technicians.push(technician);
        self
    }

    /// Adds a request.
    pub fn add_request(mut self, request: RequestBuilder) -> Self {
        self.requests.push(request);
        self
    }

    /// Adds multiple requests.
    pub fn add_requests(mut self, requests: impl IntoIterator<Item = RequestBuilder>) -> Self {
        self.requests.extend(requests);
        self
    }

    /// Sets the policy for requests which cannot be served by any technician.
    pub fn unservable_policy(mut self, policy: UnservablePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets a logger used to report preprocessing warnings.
    pub fn logger(mut self, logger: InfoLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Builds and preprocesses the [Instance].
    pub fn build(self) -> GenericResult<Instance> {
        self.validate()?;

        let dimensions = self.dimensions;
        let fleet_size = self.technicians.len();
        let request_offset = 1 + fleet_size;
        let home_duplicate_offset = request_offset + self.requests.len();
        let depot_duplicate_offset = home_duplicate_offset + fleet_size;

        let depot_node = |id: NodeId, kind: NodeKind, name: String, location: Location, time_window: TimeWindow| Node {
            id,
            kind,
            name,
            location,
            time_window,
            service_time: 0.,
            skills: BitVec::new(dimensions.skills),
            tools: BitVec::new(dimensions.tools),
            spare_parts: vec![0; dimensions.spare_parts],
            released: true,
        };

        let mut nodes = vec![depot_node(0, NodeKind::MainDepot, "depot".to_string(), self.depot, self.depot_time_window.clone())];

        nodes.extend(self.technicians.iter().enumerate().map(|(idx, tech)| {
            depot_node(1 + idx, NodeKind::Home { technician: idx }, tech.name.clone(), tech.home, tech.shift.clone())
        }));

        nodes.extend(self.requests.iter().enumerate().map(|(idx, request)| Node {
            id: request_offset + idx,
            kind: NodeKind::Request,
            name: request.name.clone(),
            location: request.location,
            time_window: request.time_window.clone(),
            service_time: request.service_time,
            skills: BitVec::from_indices(dimensions.skills, &request.skills),
            tools: BitVec::from_indices(dimensions.tools, &request.tools),
            spare_parts: request.spare_parts.clone(),
            released: request.released,
        }));

        nodes.extend(self.technicians.iter().enumerate().map(|(idx, tech)| {
            let name = format!("{}-end", tech.name);
            depot_node(home_duplicate_offset + idx, NodeKind::HomeDuplicate { technician: idx }, name, tech.home, tech.shift.clone())
        }));

        nodes.extend(self.technicians.iter().enumerate().map(|(idx, tech)| {
            let name = format!("depot-{}", tech.name);
            depot_node(
                depot_duplicate_offset + idx,
                NodeKind::MainDepotDuplicate { technician: idx },
                name,
                self.depot,
                self.depot_time_window.clone(),
            )
        }));

        let technicians = self
            .technicians
            .iter()
            .enumerate()
            .map(|(idx, tech)| Technician {
                id: idx,
                name: tech.name.clone(),
                home: 1 + idx,
                home_duplicate: home_duplicate_offset + idx,
                main_depot_duplicate: depot_duplicate_offset + idx,
                speed: tech.speed,
                skills: BitVec::from_indices(dimensions.skills, &tech.skills),
                tools: BitVec::from_indices(dimensions.tools, &tech.tools),
                spare_parts: tech.spare_parts.clone(),
            })
            .collect::<Vec<_>>();

        let distances = nodes
            .iter()
            .flat_map(|from| nodes.iter().map(move |to| from.location.distance(&to.location)))
            .collect::<Vec<_>>();

        let max_speed = technicians.iter().map(|tech| tech.speed).fold(f64::MIN_POSITIVE, f64::max);
        let arc_feasibility = create_arc_feasibility(&nodes, &distances, max_speed);

        let names = nodes
            .iter()
            .filter(|node| matches!(node.kind, NodeKind::Request | NodeKind::Home { .. }))
            .map(|node| (node.name.clone(), node.id))
            .collect::<FxHashMap<_, _>>();

        let mut instance = Instance {
            requests: (request_offset..home_duplicate_offset).collect(),
            nodes,
            technicians,
            dimensions,
            distances,
            arc_feasibility,
            compatibility: vec![],
            compatible_technicians: vec![],
            names,
        };

        instance.compatibility = create_compatibility(&instance);
        instance.compatible_technicians = (0..instance.max_id())
            .map(|node| (0..fleet_size).filter(|&tech| instance.compatibility[tech].full[node]).collect())
            .collect();

        self.check_servable(&instance)?;

        Ok(instance)
    }

    fn validate(&self) -> GenericResult<()> {
        if self.technicians.is_empty() {
            return Err("an instance should have at least one technician".into());
        }

        let dimensions = self.dimensions;
        let check_indices = |owner: &str, kind: &str, indices: &[usize], size: usize| -> GenericResult<()> {
            match indices.iter().find(|&&idx| idx >= size) {
                Some(idx) => Err(format!("{owner}: {kind} index {idx} is out of range, only {size} defined").into()),
                None => Ok(()),
            }
        };
        let check_time_window = |owner: &str, tw: &TimeWindow| -> GenericResult<()> {
            if tw.start > tw.end || tw.start.is_nan() || tw.end.is_nan() {
                Err(format!("{owner}: invalid time window [{}, {}]", tw.start, tw.end).into())
            } else {
                Ok(())
            }
        };

        check_time_window("main depot", &self.depot_time_window)?;

        let mut names = FxHashSet::default();
        for tech in self.technicians.iter() {
            check_indices(&tech.name, "skill", &tech.skills, dimensions.skills)?;
            check_indices(&tech.name, "tool", &tech.tools, dimensions.tools)?;
            check_time_window(&tech.name, &tech.shift)?;

            if !(tech.speed > 0.) {
                return Err(format!("{}: speed should be positive", tech.name).into());
            }
            if tech.spare_parts.len() != dimensions.spare_parts || tech.spare_parts.iter().any(|&amount| amount < 0) {
                return Err(format!("{}: expected {} non negative spare part amounts", tech.name, dimensions.spare_parts).into());
            }
            if !names.insert(tech.name.as_str()) {
                return Err(format!("duplicate name: '{}'", tech.name).into());
            }
        }

        for request in self.requests.iter() {
            check_indices(&request.name, "skill", &request.skills, dimensions.skills)?;
            check_indices(&request.name, "tool", &request.tools, dimensions.tools)?;
            check_time_window(&request.name, &request.time_window)?;

            if request.service_time < 0. {
                return Err(format!("{}: service time should not be negative", request.name).into());
            }
            if request.spare_parts.len() != dimensions.spare_parts || request.spare_parts.iter().any(|&amount| amount < 0) {
                return Err(format!("{}: expected {} non negative spare part amounts", request.name, dimensions.spare_parts).into());
            }
            if !names.insert(request.name.as_str()) {
                return Err(format!("duplicate name: '{}'", request.name).into());
            }
        }

        Ok(())
    }

    fn check_servable(&self, instance: &Instance) -> GenericResult<()> {
        let unservable = instance
            .requests()
            .iter()
            .filter(|&&request| instance.compatible_technicians(request).is_empty())
            .map(|&request| GenericError::from(format!("request '{}' cannot be served by any technician", instance.node(request).name)))
            .collect::<Vec<_>>();

        if unservable.is_empty() {
            return Ok(());
        }

        match (self.policy, self.logger.as_ref()) {
            (UnservablePolicy::Reject, _) => Err(GenericError::join_many(&unservable, ", ").into()),
            (UnservablePolicy::Warn, Some(logger)) => {
                unservable.iter().for_each(|err| (logger)(&format!("warning: {err}")));
                Ok(())
            }
            (UnservablePolicy::Warn, None) => Ok(()),
        }
    }
}
