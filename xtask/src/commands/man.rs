use std::fs;
use std::path::PathBuf;

use clap::Args;

#[derive(Args, Debug)]
pub struct ManArgs {
    /// Output directory (default: dist/share/man/man1)
    #[arg(long = "out-dir", default_value = "dist/share/man/man1")]
    pub out_dir: PathBuf,
}

pub fn cmd_man(args: ManArgs) -> Result<(), String> {
    let out_dir = crate::workspace_root().join(args.out_dir);
    fs::create_dir_all(&out_dir).map_err(|e| format!("{}: {e}", out_dir.display()))?;

    // Neither binary has subcommands, so one page each.
    for (bin_name, cmd) in crate::binaries() {
        let mut buffer: Vec<u8> = Vec::new();
        clap_mangen::Man::new(cmd)
            .render(&mut buffer)
            .map_err(|e| format!("render manpage for {bin_name}: {e}"))?;

        let man_path = out_dir.join(format!("{bin_name}.1"));
        fs::write(&man_path, buffer).map_err(|e| format!("{}: {e}", man_path.display()))?;
        println!("wrote {}", man_path.display());
    }

    Ok(())
}
