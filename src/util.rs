use {
    anyhow::Result,
    serde::{
        de::DeserializeOwned,
        Serialize,
    },
    std::{
        fs::{
            read_to_string,
            File,
        },
        io::Write,
        path::Path,
    },
};


/// Write any serializable config (or record) to a pretty-printed `.ron` file.
pub fn write_config<C: Serialize + ?Sized>(
    config: &C,
    path: impl AsRef<Path>,
) -> Result<()> {
    File::create(path)?.write_all(
        ron::ser::to_string_pretty(
            config,
            ron::ser::PrettyConfig::default(),
        )?.as_bytes()
    )?;
    Ok(())
}

pub fn read_config<C: DeserializeOwned>(path: impl AsRef<Path>) -> Result<C> {
    Ok(ron::from_str(&read_to_string(path)?)?)
}
