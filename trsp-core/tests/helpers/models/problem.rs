use crate::models::common::{Location, NodeId, TimeWindow};
use crate::models::problem::*;
use std::sync::Arc;

pub fn test_technician(name: &str) -> TechnicianBuilder {
    TechnicianBuilder::new(name).home(Location::new(0., 0.)).shift(TimeWindow::new(0., 1000.))
}

pub fn test_request(name: &str, x: f64) -> RequestBuilder {
    RequestBuilder::new(name).location(Location::new(x, 0.))
}

pub fn test_instance_builder() -> InstanceBuilder {
    InstanceBuilder::default().main_depot(Location::new(0., 0.), TimeWindow::new(0., 1000.))
}

/// Creates an instance with one technician living at the origin and requests on the x axis.
pub fn create_line_instance(xs: &[f64]) -> Arc<Instance> {
    let instance = test_instance_builder()
        .add_technician(test_technician("t0"))
        .add_requests(xs.iter().enumerate().map(|(idx, &x)| test_request(&format!("r{idx}"), x)))
        .build()
        .expect("cannot build instance");

    Arc::new(instance)
}

/// Returns ids of requests in the order they were added to the builder.
pub fn get_request_ids(instance: &Instance) -> Vec<NodeId> {
    instance.requests().to_vec()
}

/// Creates an instance with one technician and requests which use time windows, tools and spare parts.
pub fn create_rich_instance() -> Arc<Instance> {
    let instance = test_instance_builder()
        .dimensions(ResourceDimensions { skills: 1, tools: 2, spare_parts: 2 })
        .add_technician(
            TechnicianBuilder::new("t0")
                .home(Location::new(5., 5.))
                .shift(TimeWindow::new(10., 500.))
                .speed(1.5)
                .tools(&[0])
                .spare_parts(&[2, 1]),
        )
        .add_requests(vec![
            RequestBuilder::new("r0")
                .location(Location::new(10., 0.))
                .time_window(TimeWindow::new(30., 80.))
                .service_time(5.)
                .spare_parts(&[0, 0]),
            RequestBuilder::new("r1").location(Location::new(20., 10.)).tools(&[1]).spare_parts(&[1, 0]).service_time(10.),
            RequestBuilder::new("r2")
                .location(Location::new(0., 30.))
                .time_window(TimeWindow::new(100., 150.))
                .spare_parts(&[0, 0]),
            RequestBuilder::new("r3").location(Location::new(15., 15.)).spare_parts(&[2, 1]).service_time(3.),
            RequestBuilder::new("r4")
                .location(Location::new(30., 0.))
                .tools(&[0])
                .time_window(TimeWindow::new(0., 60.))
                .spare_parts(&[0, 0]),
            RequestBuilder::new("r5").location(Location::new(-10., 5.)).spare_parts(&[0, 2]).service_time(7.),
        ])
        .unservable_policy(UnservablePolicy::Warn)
        .build()
        .expect("cannot build instance");

    Arc::new(instance)
}

/// Creates an instance with technicians living in the corners of a square and requests scattered
/// over it in a deterministic way.
pub fn create_scattered_instance(fleet_size: usize, size: usize) -> Arc<Instance> {
    let corners = [(0., 0.), (60., 0.), (60., 45.), (0., 45.)];

    let instance = (0..fleet_size)
        .fold(test_instance_builder(), |builder, idx| {
            let (x, y) = corners[idx % corners.len()];
            builder.add_technician(TechnicianBuilder::new(&format!("t{idx}")).home(Location::new(x, y)).shift(TimeWindow::new(0., 1000.)))
        })
        .add_requests((0..size).map(|idx| {
            let location = Location::new(((idx * 37) % 60) as f64, ((idx * 23) % 45) as f64);
            RequestBuilder::new(&format!("r{idx}")).location(location).service_time((idx % 3) as f64)
        }))
        .build()
        .expect("cannot build instance");

    Arc::new(instance)
}

/// Creates an instance with a technician without tools and spare parts, the main depot is at 20 on the x axis.
/// Nodes: 1 home, 2 request at 10 which needs a tool, 3 request at 30 which needs a spare part, 4 home duplicate,
/// 5 main depot duplicate.
pub fn create_depot_trip_instance() -> Arc<Instance> {
    let instance = InstanceBuilder::default()
        .main_depot(Location::new(20., 0.), TimeWindow::new(0., 1000.))
        .dimensions(ResourceDimensions { skills: 0, tools: 1, spare_parts: 1 })
        .add_technician(test_technician("t0").spare_parts(&[0]))
        .add_request(test_request("needs_tool", 10.).tools(&[0]).spare_parts(&[0]))
        .add_request(test_request("needs_part", 30.).spare_parts(&[1]))
        .build()
        .expect("cannot build instance");

    Arc::new(instance)
}
