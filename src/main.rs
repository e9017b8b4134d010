use log::{error, info};
use soltrace_scene::{read_st_input, Basis, DeviceRecord, Scene};

const DEFAULT_NUM_SUN_POINTS: u32 = 1000;

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <stinput file> [number of sun rays]", args[0]);
        std::process::exit(2);
    }
    let num_sun_points = match args.get(2).map(|arg| arg.parse::<u32>()) {
        None => DEFAULT_NUM_SUN_POINTS,
        Some(Ok(n)) => n,
        Some(Err(err)) => {
            error!("invalid number of sun rays '{}': {}", args[2], err);
            std::process::exit(2);
        }
    };
    let mut scene = match read_st_input(&args[1]) {
        Ok(scene) => scene,
        Err(err) => {
            error!("error in system input file: {}", err);
            std::process::exit(1);
        }
    };
    if let Err(err) = summarize(&mut scene, num_sun_points) {
        error!("{}", err);
        std::process::exit(1);
    }
}

fn summarize(scene: &mut Scene, num_sun_points: u32) -> Result<(), soltrace_scene::GeometryError> {
    let bounds = scene.compute_bounding_boxes()?;
    let records = scene.device_records()?;
    let params = scene.launch_params(num_sun_points)?;
    info!("scene bounds {:?} .. {:?}", bounds.min, bounds.max);

    println!(
        "sun vector {:?}, sun angle {} rad, {} sun rays, max depth {}",
        params.sun_vector.as_slice(),
        params.max_sun_angle,
        params.num_sun_points,
        params.max_depth
    );
    for (i, (element, record)) in scene.elements().iter().zip(&records).enumerate() {
        let facing = element.rotation_matrix().z_basis();
        println!(
            "{:4} {:20} origin {:?} facing {:?}{}",
            i,
            record.name(),
            element.origin().as_slice(),
            facing.as_slice(),
            if element.is_receiver() { " (receiver)" } else { "" }
        );
    }
    let cylinders = records
        .iter()
        .filter(|record| matches!(record, DeviceRecord::CylinderY { .. }))
        .count();
    println!("{} device records, {} cylinders", records.len(), cylinders);
    Ok(())
}
