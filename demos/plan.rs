/*
Copyright 2017 Takashi Ogura

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/
use gear_capi::{PlanRequest, PlannerKind, Session};
use std::env;

fn main() -> gear_capi::Result<()> {
    env_logger::init();
    // cargo run --example plan -- sample/planar_arm.plan.xml [rrtConnect]
    let mut args = env::args().skip(1);
    let plan_path = args
        .next()
        .unwrap_or_else(|| "sample/planar_arm.plan.xml".to_owned());
    let mut session = Session::new();
    session.load_plan(&plan_path)?;
    println!(
        "robot {:?}, dof={}, dynamic={}",
        session.robot_model_name(),
        session.dof()?,
        session.is_dynamic()
    );

    let mut request = PlanRequest::new();
    if let Some(kind) = args.next() {
        request = request.planner_kind(kind.parse::<PlannerKind>()?);
    }
    let path = session.plan(&request)?;
    for (i, q) in path.iter().enumerate() {
        println!("{:3}: {:?}", i, q);
    }
    if let Some(planner) = session.planner() {
        println!("{} vertices", planner.num_vertices());
    }
    Ok(())
}
