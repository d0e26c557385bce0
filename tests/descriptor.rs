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
use gear_capi::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn sample(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("sample").join(name)
}

fn write_recipe(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

fn model_element(scene: &str) -> String {
    format!(
        "<model><kinematics href=\"{}\"/><scene href=\"{}\"/><model>0</model></model>",
        sample("planar_arm.urdf").display(),
        sample(scene).display()
    )
}

#[test]
fn test_load_sample_recipe() {
    let mut session = Session::new();
    session.load_plan(sample("planar_arm.plan.xml")).unwrap();
    assert!(session.is_initialized());
    assert_eq!(session.dof().unwrap(), 2);
    assert_eq!(session.planner_kind(), Some(PlannerKind::RrtConCon));
    assert!((session.params().delta - 0.0872665).abs() < 1e-6);
    assert_eq!(session.params().epsilon, 0.001);
    assert_eq!(session.params().timeout_ms(), 2000);
    assert_eq!(session.start(), Some(&[0.0, 0.0][..]));
    let goal = session.goal().unwrap().to_vec();
    assert!((goal[0] - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
    assert_eq!(goal[1], 0.5);
    // components are ready before the first plan
    assert_eq!(session.planner().unwrap().kind(), PlannerKind::RrtConCon);

    let path = session.plan(&PlanRequest::new()).unwrap();
    assert_eq!(path[0], vec![0.0, 0.0]);
    assert_eq!(path[path.len() - 1], goal);
}

#[test]
fn test_recipe_loads_the_same_twice() {
    let mut first = Session::new();
    let mut second = Session::new();
    first.load_plan(sample("planar_arm.plan.xml")).unwrap();
    second.load_plan(sample("planar_arm.plan.xml")).unwrap();
    assert_eq!(first.dof().unwrap(), second.dof().unwrap());
    assert_eq!(first.params(), second.params());
    assert_eq!(first.start(), second.start());
    assert_eq!(first.goal(), second.goal());
    assert_eq!(first.planner_kind(), second.planner_kind());
    assert_eq!(first.nearest_kind(), second.nearest_kind());
    assert_eq!(first.verifier_kind(), second.verifier_kind());
    assert_eq!(first.robot_model_name(), second.robot_model_name());
}

#[test]
fn test_degree_units() {
    let dir = tempdir().unwrap();
    let path = write_recipe(
        dir.path(),
        "deg.plan.xml",
        &format!(
            "<rlplan>{}<rrt>\
               <delta unit=\"deg\">1</delta>\
               <start><q unit=\"deg\">90</q><q>0</q></start>\
               <goal><q unit=\"deg\">-90</q><q unit=\"deg\">45</q></goal>\
             </rrt></rlplan>",
            model_element("empty_scene.xml")
        ),
    );
    let mut session = Session::new();
    session.load_plan(&path).unwrap();
    assert_eq!(session.planner_kind(), Some(PlannerKind::Rrt));
    assert!((session.params().delta - 1.0f64.to_radians()).abs() < 1e-12);
    assert!((session.start().unwrap()[0] - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    let goal = session.goal().unwrap();
    assert!((goal[0] + std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    assert!((goal[1] - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
}

#[test]
fn test_recipe_with_include() {
    let dir = tempdir().unwrap();
    write_recipe(dir.path(), "model.xml", &model_element("blocked_scene.xml"));
    let path = write_recipe(
        dir.path(),
        "include.plan.xml",
        "<rlplan xmlns:xi=\"http://www.w3.org/2001/XInclude\">\
           <xi:include href=\"model.xml\"/>\
           <prm><duration>5</duration><kdtreeNearestNeighbors/><sequentialVerifier/></prm>\
           <start><q>0.6</q><q>0.5</q></start>\
           <goal><q>1.4</q><q>0.5</q></goal>\
         </rlplan>",
    );
    let mut session = Session::with_config(SessionConfig::new().seed(7));
    session.load_plan(&path).unwrap();
    assert_eq!(session.robot_model_name(), Some("arm"));
    assert_eq!(session.planner_kind(), Some(PlannerKind::Prm));
    assert_eq!(session.nearest_kind(), NearestNeighboursKind::Kdtree);
    assert_eq!(session.verifier_kind(), VerifierKind::Sequential);

    let path = session.plan(&PlanRequest::new().delta(0.05)).unwrap();
    assert_eq!(path[0], vec![0.6, 0.5]);
    assert_eq!(path[path.len() - 1], vec![1.4, 0.5]);
    for q in &path {
        assert!(session.is_valid_configuration(q).unwrap(), "{:?}", q);
    }
}

#[test]
fn test_broken_recipes() {
    let dir = tempdir().unwrap();
    let recipes = [
        format!("<rlplan>{}", model_element("empty_scene.xml")),
        "<rlplan><model><scene href=\"empty_scene.xml\"/></model></rlplan>".to_owned(),
        format!(
            "<rlplan><model><kinematics href=\"{}\"/><scene href=\"{}\"/><model>-1</model></model></rlplan>",
            sample("planar_arm.urdf").display(),
            sample("empty_scene.xml").display()
        ),
        format!(
            "<rlplan>{}<start><q>zero</q><q>0</q></start></rlplan>",
            model_element("empty_scene.xml")
        ),
        "<rlplan><model><kinematics href=\"missing.urdf\"/><scene href=\"missing.xml\"/></model></rlplan>"
            .to_owned(),
    ];
    for (i, recipe) in recipes.iter().enumerate() {
        let path = write_recipe(dir.path(), &format!("broken{}.plan.xml", i), recipe);
        let err = Session::new().load_plan(&path).err().unwrap();
        assert_eq!(err.code(), ErrorCode::LoadFailed, "{}: {}", recipe, err);
    }
    let err = Session::new()
        .load_plan(dir.path().join("not_written.plan.xml"))
        .err()
        .unwrap();
    assert_eq!(err.code(), ErrorCode::LoadFailed);
}

#[test]
fn test_start_outside_limits() {
    let dir = tempdir().unwrap();
    let path = write_recipe(
        dir.path(),
        "limits.plan.xml",
        &format!(
            "<rlplan>{}<start><q>4</q><q>0</q></start></rlplan>",
            model_element("empty_scene.xml")
        ),
    );
    let err = Session::new().load_plan(&path).err().unwrap();
    assert_eq!(err.code(), ErrorCode::InvalidParameter);
}
