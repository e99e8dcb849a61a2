//! Example: packaging a small project with projpack-core
//!
//! Run with: `cargo run --example pack_project`

use projpack_core::PackConfig;
use projpack_core::Packager;
use projpack_core::ProjectSpec;
use projpack_core::gather_files;
use projpack_core::render_tree;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = std::env::temp_dir().join("projpack_example");
    let project = workspace.join("demo");
    std::fs::create_dir_all(project.join("src/__pycache__"))?;
    std::fs::write(project.join("src/app.py"), "print('hello')\n")?;
    std::fs::write(project.join("src/__pycache__/app.cpython.pyc"), [0u8; 16])?;
    std::fs::write(project.join("README.md"), "# demo\n")?;

    // Example 1: inspect the selection before packaging
    println!("Example 1: selection");
    let files = gather_files(&project, &[".py", ".md"], &["src/__pycache__"])?;
    println!("{}", render_tree(files.as_slice(), &project)?);

    // Example 2: a full run
    println!("\nExample 2: packaging run");
    let spec = ProjectSpec::new(&project, [".py", ".md"], ["src/__pycache__"]);
    spec.validate()?;
    let packager = Packager::new(PackConfig::default().with_output_dir(workspace.join("out")));
    let result = packager.run(&spec);
    println!("{}", result.message);

    std::fs::remove_dir_all(&workspace)?;
    Ok(())
}
