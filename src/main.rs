use clap::{arg,crate_version,Command};
use huffcodec::huff;
type DYNERR = Box<dyn std::error::Error>;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const RCH: &str = "unreachable was reached";
const COMPRESSED_PATH: &str = "sample_compressed.huff";
const EXPANDED_PATH: &str = "sample_decompressed.txt";

fn ok_to_overwrite(path_out: &str) -> bool {
    if let Ok(_f) = std::fs::File::open(path_out) {
        let mut ans = String::new();
        eprint!("{} exists, overwrite? (y/n) ",path_out);
        std::io::stdin().read_line(&mut ans).expect("could not read stdin");
        if ans.trim_end()=="y" || ans.trim_end()=="Y" {
            return true;
        }
        return false;
    }
    true
}

/// Run compression or expansion on whole files.
/// The output is only written once the codec has succeeded.
fn transform(path_in: &str,path_out: &str,expanding: bool) -> Result<(u64,u64),DYNERR> {
    let mut in_file = std::fs::File::open(path_in)?;
    let mut out_buf = std::io::Cursor::new(Vec::new());
    let (in_size,out_size) = match expanding {
        false => huff::compress(&mut in_file,&mut out_buf,&huff::STD_OPTIONS)?,
        true => huff::expand(&mut in_file,&mut out_buf,&huff::STD_OPTIONS)?
    };
    std::fs::write(path_out,out_buf.into_inner())?;
    log::debug!("wrote {} bytes to {}",out_size,path_out);
    Ok((in_size,out_size))
}

/// Compress to an intermediate file, expand it again, and report the ratio.
fn round_trip(path_in: &str,path_cmp: &str,path_out: &str) -> STDRESULT {
    if !std::path::Path::new(path_in).exists() {
        eprintln!("error: {} does not exist",path_in);
        std::process::exit(1);
    }
    transform(path_in,path_cmp,false)?;
    eprintln!("compressed {} into {}",path_in,path_cmp);
    transform(path_cmp,path_out,true)?;
    eprintln!("expanded {} into {}",path_cmp,path_out);
    let original_size = std::fs::metadata(path_in)?.len();
    let compressed_size = std::fs::metadata(path_cmp)?.len();
    println!("original size: {} bytes",original_size);
    println!("compressed size: {} bytes",compressed_size);
    println!("compression ratio: {:.2}%",huff::ratio(original_size,compressed_size));
    Ok(())
}

fn main() -> STDRESULT
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let long_help =
"Examples:
---------
Round trip:    `huffcodec my_file.txt`
Compress:      `huffcodec compress -i my_file.txt -o my_file.huff`
Expand:        `huffcodec expand -i my_file.huff -o my_file.txt`";

    let mut main_cmd = Command::new("huffcodec")
        .about("Compress and expand with static Huffman coding")
        .after_long_help(long_help)
        .version(crate_version!())
        .args_conflicts_with_subcommands(true)
        .subcommand_negates_reqs(true)
        .arg_required_else_help(true)
        .arg(arg!(<FILE> "file to compress and expand again"))
        .arg(arg!(--compressed <PATH> "path of the intermediate compressed file")
            .default_value(COMPRESSED_PATH))
        .arg(arg!(--output <PATH> "path of the expanded file")
            .default_value(EXPANDED_PATH));
    main_cmd = main_cmd.subcommand(Command::new("compress")
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .about("compress a file"));

    main_cmd = main_cmd.subcommand(Command::new("expand")
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .about("expand a file"));

    let matches = main_cmd.get_matches();

    if let Some(path_in) = matches.get_one::<String>("FILE") {
        let path_cmp = matches.get_one::<String>("compressed").expect(RCH);
        let path_out = matches.get_one::<String>("output").expect(RCH);
        return round_trip(path_in,path_cmp,path_out);
    }

    for (name,expanding) in [("compress",false),("expand",true)] {
        if let Some(cmd) = matches.subcommand_matches(name) {
            let path_in = cmd.get_one::<String>("input").expect(RCH);
            let path_out = cmd.get_one::<String>("output").expect(RCH);
            if !ok_to_overwrite(path_out) {
                eprintln!("abort operation");
                return Ok(());
            }
            let (in_size,out_size) = transform(path_in,path_out,expanding)?;
            match expanding {
                false => eprintln!("compressed {} into {}",in_size,out_size),
                true => eprintln!("expanded {} into {}",in_size,out_size)
            }
        }
    }

    Ok(())
}
