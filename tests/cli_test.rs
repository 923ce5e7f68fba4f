use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*;
use std::path::PathBuf;
use std::process::Command; // Run programs
use tempfile;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const SAM: &str = "I am Sam. Sam I am. I do not like this Sam I am.\n\
Do you like green eggs and ham? I do not like them, Sam-I-am.\n\
I do not like green eggs and ham.\n";

fn write_input(temp_dir: &tempfile::TempDir,name: &str,dat: &[u8]) -> Result<PathBuf,Box<dyn std::error::Error>> {
    let path = temp_dir.path().join(name);
    std::fs::write(&path,dat)?;
    Ok(path)
}

#[test]
fn round_trip_with_fixed_names() -> STDRESULT {
    let mut cmd = Command::cargo_bin("huffcodec")?;
    let temp_dir = tempfile::tempdir()?;
    let sam = SAM.repeat(20);
    let in_path = write_input(&temp_dir,"sam.txt",sam.as_bytes())?;
    cmd.current_dir(temp_dir.path())
        .arg(&in_path)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("original size: {} bytes",sam.len())))
        .stdout(predicate::str::contains("compression ratio:"));
    let compressed = std::fs::read(temp_dir.path().join("sample_compressed.huff"))?;
    let expanded = std::fs::read(temp_dir.path().join("sample_decompressed.txt"))?;
    assert_eq!(&compressed[0..3],"HUF".as_bytes());
    assert!(compressed.len() < sam.len());
    assert_eq!(expanded,sam.as_bytes());
    Ok(())
}

#[test]
fn round_trip_with_chosen_names() -> STDRESULT {
    let mut cmd = Command::cargo_bin("huffcodec")?;
    let temp_dir = tempfile::tempdir()?;
    let in_path = write_input(&temp_dir,"single.txt","zzzzzzzzzzzz".as_bytes())?;
    let cmp_path = temp_dir.path().join("single.huff");
    let out_path = temp_dir.path().join("single.out");
    cmd.arg(&in_path)
        .arg("--compressed").arg(&cmp_path)
        .arg("--output").arg(&out_path)
        .assert()
        .success();
    assert_eq!(std::fs::read(out_path)?,"zzzzzzzzzzzz".as_bytes());
    Ok(())
}

#[test]
fn missing_input() -> STDRESULT {
    let mut cmd = Command::cargo_bin("huffcodec")?;
    let temp_dir = tempfile::tempdir()?;
    cmd.current_dir(temp_dir.path())
        .arg("no_such_file.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
    assert!(!temp_dir.path().join("sample_compressed.huff").exists());
    Ok(())
}

#[test]
fn empty_input() -> STDRESULT {
    let mut cmd = Command::cargo_bin("huffcodec")?;
    let temp_dir = tempfile::tempdir()?;
    let in_path = write_input(&temp_dir,"empty.txt",&[])?;
    let out_path = temp_dir.path().join("empty.huff");
    cmd.arg("compress")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&out_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("EmptyInput"));
    assert!(!out_path.exists());
    Ok(())
}

#[test]
fn compression() -> STDRESULT {
    let mut cmd = Command::cargo_bin("huffcodec")?;
    let temp_dir = tempfile::tempdir()?;
    let in_path = write_input(&temp_dir,"abc.txt","aaabbc".as_bytes())?;
    let out_path = temp_dir.path().join("abc.huff");
    cmd.arg("compress")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success();
    let expected = hex::decode("48 55 46 01 03 00 61 01 00 62 02 C0 63 02 80 07 02 00 00 00 00 00 00 00 1F 00".replace(" ",""))?;
    assert_eq!(std::fs::read(out_path)?,expected);
    Ok(())
}

#[test]
fn compression_and_expansion() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = write_input(&temp_dir,"sam.txt",SAM.as_bytes())?;
    let cmp_path = temp_dir.path().join("sam.huff");
    let out_path = temp_dir.path().join("sam.out");
    Command::cargo_bin("huffcodec")?
        .arg("compress")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&cmp_path)
        .assert()
        .success();
    Command::cargo_bin("huffcodec")?
        .arg("expand")
        .arg("-i").arg(&cmp_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success();
    assert_eq!(std::fs::read(out_path)?,SAM.as_bytes());
    Ok(())
}

#[test]
fn corrupt_container() -> STDRESULT {
    let mut cmd = Command::cargo_bin("huffcodec")?;
    let temp_dir = tempfile::tempdir()?;
    let in_path = write_input(&temp_dir,"bad.huff","HUF\x01\x03\x00a".as_bytes())?;
    let out_path = temp_dir.path().join("bad.out");
    cmd.arg("expand")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&out_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("CorruptContainer"));
    assert!(!out_path.exists());
    Ok(())
}

#[test]
fn options_without_file() -> STDRESULT {
    let mut cmd = Command::cargo_bin("huffcodec")?;
    let temp_dir = tempfile::tempdir()?;
    cmd.current_dir(temp_dir.path())
        .arg("--compressed").arg("x.huff")
        .assert()
        .failure()
        .stderr(predicate::str::contains("FILE"));
    assert!(!temp_dir.path().join("x.huff").exists());
    Ok(())
}
