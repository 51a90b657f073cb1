use anyhow::Result;
use nalgebra::Vector3;
use rs_stewart_kinematics::actuator::duty_cycle;
use rs_stewart_kinematics::control_loop::ControlLoop;
use rs_stewart_kinematics::geometry::Geometry;
use rs_stewart_kinematics::kinematics_impl::Platform;
use rs_stewart_kinematics::optimizer::OptimiserSettings;
use rs_stewart_kinematics::utils::dump_struts;

/// Usage example: a headless session on the demo geometry.
fn main() -> Result<()> {
    let geometry = Geometry::demo();
    println!(
        "Demo platform: {} struts, reach {:.1}..{:.1}",
        geometry.struts,
        geometry.min_reach(),
        geometry.max_reach()
    );

    let mut platform = Platform::new(geometry);
    println!("\nIdentity pose solves exactly:");
    platform.solve();
    platform.configure();
    dump_struts(&platform);
    println!("epsilon = {:e}", platform.epsilon());

    // Ask for a pose the struts cannot reach, then let the optimiser
    // compromise on the displacement (heavily) and attitude (lightly).
    println!("\nRequesting an over-displaced pose:");
    platform.pose_mut().displacement = Vector3::new(0.0, 300.0, 0.0);
    platform.pose_mut().pitch = 0.1;
    platform.solve();
    dump_struts(&platform);
    println!("epsilon = {:e}", platform.epsilon());

    let settings = OptimiserSettings::default();
    let mut calls = 0;
    while !platform.optimise(&settings.freedom, settings.jumpscale, settings.chunk) {
        calls += 1;
        if calls >= 200 {
            break;
        }
    }
    println!("\nAfter optimisation ({} chunks of {}):", calls, settings.chunk);
    platform.configure();
    dump_struts(&platform);
    println!(
        "epsilon = {:e}, platform height {:.1}",
        platform.epsilon(),
        platform.pose().displacement.y
    );

    println!("\nDuty cycles the actuator bridge would send:");
    for i in 0..platform.geometry().struts {
        println!("channel {}: {:.1}", i, duty_cycle(platform[i].motor_angle));
    }

    // The same thing, paced: a short burst of real-time cycles at 120 Hz.
    println!("\nRunning 24 paced cycles at 120 Hz:");
    let mut control = ControlLoop::new(
        Platform::new(Geometry::demo()),
        120.0,
        OptimiserSettings::default(),
    );
    control.platform.pose_mut().displacement = Vector3::new(0.0, 150.0, 0.0);
    let mut last = None;
    control.run_cycles(24, |report| last = Some(*report));
    if let Some(report) = last {
        println!(
            "last cycle: epsilon {:e} -> {:e}, {} iterations, converged: {}",
            report.epsilon_before, report.epsilon_after, report.iterations, report.converged
        );
    }

    #[cfg(feature = "allow_filesystem")]
    {
        use rs_stewart_kinematics::session_from_file::SessionConfig;
        // Sessions normally come from a YAML file; parse an inline one here.
        let config = SessionConfig::from_yaml(
            "
platform:
  struts: 6
  base_radii: [200, 200]
  base_shape: polyedge
  platform_radii: [120, 120]
  platform_shape: polygon
  base_thickness: 12
  platform_thickness: 8
  strut_arm: 30
  strut_length: 100
  wheel_thickness: 6
control:
  target_rate: 120
",
        )?;
        println!(
            "\nParsed session: {} struts at {} Hz",
            config.geometry.struts, config.target_rate
        );
    }

    Ok(())
}
