use std::time::Instant;

use split_bvh::bvh::Builder;
use split_bvh::config::Config;
use split_bvh::objects::tri_mesh::TriMesh;
use split_bvh::objects::PrimitiveBuffer;
use split_bvh::scenes;
use split_bvh::thread::Pool;
use split_bvh::Result;

const RANDOM_PRIMITIVES: usize = 200_000;
const SEED: u64 = 0x5eed;

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .parse_default_env()
        .init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);

    let config = match args.next() {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let pool = Pool::new(Pool::available_threads(config.threads))?;
    log::info!("Using {} threads", pool.num_threads());

    let primitives = match args.next() {
        Some(path) => {
            let mut primitives = PrimitiveBuffer::new();
            for mesh in TriMesh::load_as_vec(path)? {
                for triangle in mesh.to_triangles() {
                    primitives.add_triangle(triangle);
                }
            }
            primitives
        }
        None => {
            log::info!("No mesh given, generating {} slivers", RANDOM_PRIMITIVES);
            scenes::slivers(RANDOM_PRIMITIVES, SEED)
        }
    };

    log::info!("Building BVH over {} primitives...", primitives.len());

    let mut builder = Builder::new(config.bvh);
    let now = Instant::now();
    let bvh = builder.build(&primitives.aabbs(), &primitives.indices(), &pool);
    let build_elapsed = now.elapsed();

    bvh.validate()?;
    let tree = bvh.flatten();

    log::info!(
        "Done. Build time: {:?}. {} nodes, {} leaves, {} references, depth {}, SAH cost {:.3}",
        build_elapsed,
        tree.nodes.len(),
        bvh.num_leaves(),
        bvh.num_references(),
        bvh.max_depth(),
        bvh.sah_cost()
    );

    Ok(())
}
