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
//! C ABI of the planning session
//!
//! Every function except `CreatePlanner` and `DestroyPlanner` takes the handle
//! returned by `CreatePlanner` and returns one of the codes of `ErrorCode`.
//! No error or panic crosses the boundary. Declarations are in `include/gear_capi.h`.
#![allow(non_snake_case)]

use env_logger::Env;
use log::*;
use std::ffi::CStr;
use std::os::raw::{c_char, c_double, c_int, c_void};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::ptr;
use std::slice;

use crate::errors::*;
use crate::planner::PlannerKind;
use crate::session::{PlanRequest, Session};

const SUCCESS: c_int = ErrorCode::Success as c_int;

/// Run `f`, turning errors and panics into codes
fn guard<F>(name: &str, f: F) -> c_int
where
    F: FnOnce() -> Result<c_int>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => {
            let code = e.code();
            if code == ErrorCode::Exception {
                error!("{}: {}", name, e);
            } else {
                warn!("{}: {}", name, e);
            }
            code.into()
        }
        Err(_) => {
            error!("{}: panicked", name);
            ErrorCode::Exception.into()
        }
    }
}

unsafe fn session_mut<'a>(planner: *mut c_void) -> Result<&'a mut Session> {
    (planner as *mut Session)
        .as_mut()
        .ok_or(Error::NullPointer("planner"))
}

unsafe fn str_arg<'a>(text: *const c_char, name: &'static str) -> Result<&'a str> {
    if text.is_null() {
        return Err(Error::NullPointer(name));
    }
    CStr::from_ptr(text)
        .to_str()
        .map_err(|e| Error::InvalidParameter(format!("{} is not UTF-8: {}", name, e)))
}

unsafe fn path_arg(path: *const c_char) -> Result<PathBuf> {
    Ok(PathBuf::from(str_arg(path, "path")?))
}

unsafe fn configuration_arg<'a>(
    config: *const c_double,
    size: c_int,
    name: &'static str,
) -> Result<&'a [f64]> {
    if config.is_null() {
        return Err(Error::NullPointer(name));
    }
    if size <= 0 {
        return Err(Error::InvalidParameter(format!("{} size {}", name, size)));
    }
    Ok(slice::from_raw_parts(config, size as usize))
}

/// Optional configuration: null or an empty size means "use the stored one"
unsafe fn optional_configuration_arg<'a>(config: *const c_double, size: c_int) -> Option<&'a [f64]> {
    if config.is_null() || size <= 0 {
        None
    } else {
        Some(slice::from_raw_parts(config, size as usize))
    }
}

/// Create an empty session, or return null on failure
///
/// The first call installs a logger writing to stderr; `RUST_LOG` overrides
/// its default `warn` level.
#[no_mangle]
pub extern "C" fn CreatePlanner() -> *mut c_void {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("warn")).try_init();
    match catch_unwind(|| Box::into_raw(Box::new(Session::new()))) {
        Ok(session) => session as *mut c_void,
        Err(_) => {
            error!("CreatePlanner: panicked");
            ptr::null_mut()
        }
    }
}

/// # Safety
///
/// `planner` must be null or a handle from `CreatePlanner` and `xml_path` null
/// or a NUL terminated string.
#[no_mangle]
pub unsafe extern "C" fn LoadKinematics(planner: *mut c_void, xml_path: *const c_char) -> c_int {
    guard("LoadKinematics", || {
        let session = session_mut(planner)?;
        session.load_kinematics(path_arg(xml_path)?)?;
        Ok(SUCCESS)
    })
}

/// # Safety
///
/// Same as `LoadKinematics`.
#[no_mangle]
pub unsafe extern "C" fn LoadScene(
    planner: *mut c_void,
    xml_path: *const c_char,
    robot_model_index: c_int,
) -> c_int {
    guard("LoadScene", || {
        let session = session_mut(planner)?;
        let path = path_arg(xml_path)?;
        if robot_model_index < 0 {
            return Err(Error::InvalidParameter(format!(
                "robot model index {}",
                robot_model_index
            )));
        }
        session.load_scene(path, robot_model_index as usize)?;
        Ok(SUCCESS)
    })
}

/// # Safety
///
/// Same as `LoadKinematics`.
#[no_mangle]
pub unsafe extern "C" fn LoadPlanXml(planner: *mut c_void, xml_path: *const c_char) -> c_int {
    guard("LoadPlanXml", || {
        let session = session_mut(planner)?;
        session.load_plan(path_arg(xml_path)?)?;
        Ok(SUCCESS)
    })
}

/// # Safety
///
/// `planner` must be null or a handle from `CreatePlanner`, and `config` null or
/// valid for `config_size` reads.
#[no_mangle]
pub unsafe extern "C" fn SetStartConfiguration(
    planner: *mut c_void,
    config: *const c_double,
    config_size: c_int,
) -> c_int {
    guard("SetStartConfiguration", || {
        let session = session_mut(planner)?;
        session.set_start(configuration_arg(config, config_size, "config")?)?;
        Ok(SUCCESS)
    })
}

/// # Safety
///
/// Same as `SetStartConfiguration`.
#[no_mangle]
pub unsafe extern "C" fn SetGoalConfiguration(
    planner: *mut c_void,
    config: *const c_double,
    config_size: c_int,
) -> c_int {
    guard("SetGoalConfiguration", || {
        let session = session_mut(planner)?;
        session.set_goal(configuration_arg(config, config_size, "config")?)?;
        Ok(SUCCESS)
    })
}

/// Plan and write up to `max_waypoints` rows of `dof` values into `waypoints`
///
/// Null `start`/`goal` use the stored configurations, a null or empty
/// `planner_type` the stored kind. Positive `delta`, `epsilon` and `timeout_ms`
/// override the stored parameters for this call.
///
/// # Safety
///
/// `waypoints` must be valid for `max_waypoints * dof` writes, `waypoint_count`
/// for one write; the other pointers as in `SetStartConfiguration`.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn PlanTrajectory(
    planner: *mut c_void,
    start: *const c_double,
    start_size: c_int,
    goal: *const c_double,
    goal_size: c_int,
    use_z_axis: c_int,
    planner_type: *const c_char,
    delta: c_double,
    epsilon: c_double,
    timeout_ms: c_int,
    waypoints: *mut c_double,
    max_waypoints: c_int,
    waypoint_count: *mut c_int,
) -> c_int {
    guard("PlanTrajectory", || {
        let session = session_mut(planner)?;
        if waypoints.is_null() {
            return Err(Error::NullPointer("waypoints"));
        }
        let waypoint_count = waypoint_count
            .as_mut()
            .ok_or(Error::NullPointer("waypointCount"))?;
        if max_waypoints < 0 {
            return Err(Error::InvalidParameter(format!(
                "maxWaypoints {}",
                max_waypoints
            )));
        }
        let planner_kind = if planner_type.is_null() {
            None
        } else {
            match str_arg(planner_type, "plannerType")? {
                "" => None,
                name => Some(name.parse::<PlannerKind>()?),
            }
        };
        let request = PlanRequest {
            start: optional_configuration_arg(start, start_size),
            goal: optional_configuration_arg(goal, goal_size),
            use_z_axis: use_z_axis != 0,
            planner_kind,
            delta,
            epsilon,
            timeout_ms: timeout_ms.into(),
        };
        let path = match session.plan(&request) {
            Ok(path) => path,
            Err(e) => {
                if e.code() == ErrorCode::PlanningFailed {
                    *waypoint_count = 0;
                }
                return Err(e);
            }
        };
        let dof = session.dof()?;
        let count = path.len().min(max_waypoints as usize);
        let rows = slice::from_raw_parts_mut(waypoints, count * dof);
        for (row, q) in rows.chunks_mut(dof).zip(path.iter()) {
            row.copy_from_slice(q);
        }
        *waypoint_count = count as c_int;
        debug!("PlanTrajectory: {} of {} waypoints", count, path.len());
        Ok(SUCCESS)
    })
}

/// Returns 1 if `config` is within the joint limits and collision free, else 0
///
/// # Safety
///
/// Same as `SetStartConfiguration`.
#[no_mangle]
pub unsafe extern "C" fn IsValidConfiguration(
    planner: *mut c_void,
    config: *const c_double,
    config_size: c_int,
) -> c_int {
    let valid = catch_unwind(AssertUnwindSafe(|| -> Result<bool> {
        let session = session_mut(planner)?;
        session.is_valid_configuration(configuration_arg(config, config_size, "config")?)
    }));
    match valid {
        Ok(Ok(true)) => 1,
        Ok(Ok(false)) => 0,
        Ok(Err(e)) => {
            debug!("IsValidConfiguration: {}", e);
            0
        }
        Err(_) => {
            error!("IsValidConfiguration: panicked");
            0
        }
    }
}

/// # Safety
///
/// `planner` must be null or a handle from `CreatePlanner`.
#[no_mangle]
pub unsafe extern "C" fn GetDof(planner: *mut c_void) -> c_int {
    guard("GetDof", || {
        let session = session_mut(planner)?;
        Ok(session.dof()? as c_int)
    })
}

/// Release the session; null is ignored
///
/// # Safety
///
/// `planner` must be null or a handle from `CreatePlanner` which is not used afterwards.
#[no_mangle]
pub unsafe extern "C" fn DestroyPlanner(planner: *mut c_void) {
    if planner.is_null() {
        return;
    }
    let session = Box::from_raw(planner as *mut Session);
    if catch_unwind(AssertUnwindSafe(move || drop(session))).is_err() {
        error!("DestroyPlanner: panicked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    #[test]
    fn test_null_handle() {
        let path = CString::new("sample/planar_arm.urdf").unwrap();
        let config = [0.0, 0.0];
        let mut count = 0;
        let mut out = [0.0; 4];
        unsafe {
            let null = ptr::null_mut();
            assert_eq!(LoadKinematics(null, path.as_ptr()), -1);
            assert_eq!(LoadScene(null, path.as_ptr(), 0), -1);
            assert_eq!(LoadPlanXml(null, path.as_ptr()), -1);
            assert_eq!(SetStartConfiguration(null, config.as_ptr(), 2), -1);
            assert_eq!(SetGoalConfiguration(null, config.as_ptr(), 2), -1);
            assert_eq!(
                PlanTrajectory(
                    null,
                    config.as_ptr(),
                    2,
                    config.as_ptr(),
                    2,
                    1,
                    ptr::null(),
                    0.0,
                    0.0,
                    0,
                    out.as_mut_ptr(),
                    2,
                    &mut count
                ),
                -1
            );
            assert_eq!(IsValidConfiguration(null, config.as_ptr(), 2), 0);
            assert_eq!(GetDof(null), -1);
            DestroyPlanner(null);
        }
    }

    #[test]
    fn test_null_arguments() {
        unsafe {
            let planner = CreatePlanner();
            assert!(!planner.is_null());
            assert_eq!(LoadKinematics(planner, ptr::null()), -1);
            assert_eq!(SetStartConfiguration(planner, ptr::null(), 2), -1);
            let config = [0.0, 0.0];
            assert_eq!(SetStartConfiguration(planner, config.as_ptr(), 0), -2);
            assert_eq!(SetStartConfiguration(planner, config.as_ptr(), 2), -5);
            assert_eq!(GetDof(planner), -5);
            DestroyPlanner(planner);
        }
    }
}
