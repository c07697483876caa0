use std::{env, fs};

use mmf_arena::MmfArena;
use tracing_subscriber::EnvFilter;

/// Prints the arena's usage and the size of its backing file on disk.
fn print_usage(
  label: &str,
  arena: &MmfArena,
) {
  let on_disk = fs::metadata(arena.path()).map(|m| m.len()).ok();

  println!(
    "[{}] open = {}, used = {} / {} bytes, base = {:?}, file on disk = {:?}",
    label,
    arena.is_open(),
    arena.used(),
    arena.capacity(),
    arena.as_ptr(),
    on_disk,
  );
}

fn main() -> mmf_arena::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let path = env::temp_dir().join(format!("mmf_arena_demo_{}.dat", std::process::id()));

  // Nothing touches the filesystem yet; 100 bytes rounds up to one page.
  let mut arena = MmfArena::new(&path, 100);
  print_usage("configured", &arena);

  // --------------------------------------------------------------------
  // 1) Open: create the file, size it, map it.
  // --------------------------------------------------------------------
  arena.open()?;
  print_usage("opened", &arena);

  // --------------------------------------------------------------------
  // 2) Allocate 10 bytes. The cursor moves by a whole machine word.
  // --------------------------------------------------------------------
  let first = arena.allocate(10)?;
  println!("\n[2] allocate(10) -> {:?}", first);
  print_usage("after 10 bytes", &arena);

  // --------------------------------------------------------------------
  // 3) Place typed values. Each one lands in the mapped file.
  // --------------------------------------------------------------------
  let number = arena.place(0x1122_3344_5566_7788u64)?;
  let text = arena.alloc_bytes(b"hello from the mapped file")?;
  unsafe {
    println!("\n[3] u64 at {:?} = 0x{:X}", number, number.read());
    println!(
      "[3] bytes at {:?} = {}",
      text.cast::<u8>(),
      String::from_utf8_lossy(text.as_ref())
    );
  }
  print_usage("after placement", &arena);

  // --------------------------------------------------------------------
  // 4) Ask for more than what's left. The arena is left untouched.
  // --------------------------------------------------------------------
  match arena.allocate(arena.capacity()) {
    Ok(_) => println!("\n[4] unexpectedly fit"),
    Err(e) => println!("\n[4] {}", e),
  }
  print_usage("after failed allocation", &arena);

  // --------------------------------------------------------------------
  // 5) Hand the mapping to another arena. The source is now empty.
  // --------------------------------------------------------------------
  let mut owner = arena.take();
  print_usage("source after take", &arena);
  print_usage("new owner", &owner);

  // --------------------------------------------------------------------
  // 6) Close: unmap and delete the file.
  // --------------------------------------------------------------------
  owner.close();
  println!("\n[6] file exists after close? {}", path.exists());

  Ok(())
}
