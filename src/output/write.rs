use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use flate2::{write::GzEncoder, Compression};
use glam::DVec3;
use tempfile::NamedTempFile;

use crate::{
    bucket::Bucket,
    clip::AreaType,
    common::ensure_dir_exists,
    error::{ConstructError, Result},
};

use super::{GenOutput, OutputStyle};

/// Scenery file format version written in every tile header.
pub const SCENERY_VERSION: &str = "0.4";

/// Material written for every triangle in the triangle style.
const PLACEHOLDER_MATERIAL: &str = "desert1";

/// Plain or gzip-compressed file sink.
enum Sink {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

/// Sectioned writer for the scenery tile text format.
struct TileWriter {
    sink: Sink,
}

/// Implement std::io::Write so `write!` / `writeln!` work.
impl Write for TileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.sink {
            Sink::Plain(w) => w.write(buf),
            Sink::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.sink {
            Sink::Plain(w) => w.flush(),
            Sink::Gzip(w) => w.flush(),
        }
    }
}

impl TileWriter {
    fn new(file: File, gzip: bool) -> Self {
        let file = BufWriter::new(file);
        let sink = match gzip {
            true => Sink::Gzip(GzEncoder::new(file, Compression::best())),
            false => Sink::Plain(file),
        };
        Self { sink }
    }

    /// Flush everything, writing the gzip trailer if compressing.
    fn finish(self) -> io::Result<()> {
        match self.sink {
            Sink::Plain(mut w) => w.flush(),
            Sink::Gzip(enc) => enc.finish()?.flush(),
        }
    }

    fn write_header(&mut self) -> io::Result<()> {
        let created = chrono::Local::now().format("%a %b %d %H:%M:%S %Z %Y");
        writeln!(self, "# FGFS Scenery Version {SCENERY_VERSION}")?;
        writeln!(self, "# Created {created}")?;
        writeln!(self)
    }

    fn write_sphere(&mut self, tag: &str, center: DVec3, radius: f64) -> io::Result<()> {
        writeln!(self, "# {tag} {:.5} {:.5} {:.5} {:.2}", center.x, center.y, center.z, radius)
    }

    /// Vertices relative to the global bounding-sphere center.
    fn write_vertices(&mut self, out: &GenOutput) -> io::Result<()> {
        writeln!(self, "# vertex list")?;
        for p in out.wgs84_nodes() {
            let p = *p - out.gbs_center();
            writeln!(self, "v {:.5} {:.5} {:.5}", p.x, p.y, p.z)?;
        }
        writeln!(self)
    }

    fn write_normals(&mut self, out: &GenOutput) -> io::Result<()> {
        writeln!(self, "# vertex normal list")?;
        for n in out.point_normals() {
            writeln!(self, "vn {:.5} {:.5} {:.5}", n.x, n.y, n.z)?;
        }
        writeln!(self)
    }

    fn write_tex_coords(&mut self, out: &GenOutput) -> io::Result<()> {
        writeln!(self, "# texture coordinate list")?;
        for t in out.tex_coords() {
            writeln!(self, "vt {:.5} {:.5}", t.x, t.y)?;
        }
        writeln!(self)
    }

    fn write_triangles(&mut self, out: &GenOutput) -> io::Result<()> {
        writeln!(self, "# triangle list")?;
        writeln!(self)?;
        for t in out.elements() {
            let (center, radius) = out.calc_bounding_sphere(t);
            writeln!(self, "# usemtl {PLACEHOLDER_MATERIAL}")?;
            self.write_sphere("bs", center, radius)?;
            writeln!(self, "f {} {} {}", t.n1, t.n2, t.n3)?;
            writeln!(self)?;
        }
        Ok(())
    }

    fn write_fans(&mut self, out: &GenOutput) -> io::Result<usize> {
        writeln!(self, "# triangle groups")?;
        writeln!(self)?;

        let mut total = 0;
        for area in AreaType::order() {
            let fans = out.fans(area);
            if fans.is_empty() { continue }

            let (center, radius) = out.calc_group_bounding_sphere(fans);
            log::debug!("  writing {} fans for {area}", fans.len());
            writeln!(self, "# usemtl {}", area.to_str())?;
            self.write_sphere("bs", center, radius)?;

            for (fan, tex) in fans.iter().zip(out.textures(area)) {
                total += fan.len().saturating_sub(2);
                write!(self, "tf")?;
                for (n, t) in fan.iter().zip(tex) { write!(self, " {n}/{t}")?; }
                writeln!(self)?;
            }
            writeln!(self)?;
        }
        Ok(total)
    }
}

impl GenOutput {
    /// File the tile for `bucket` is written to under `output_base`.
    pub fn tile_path(&self, bucket: &Bucket, output_base: &Path) -> PathBuf {
        let name = match self.gzip {
            true => format!("{}.gz", bucket.gen_index_str()),
            false => bucket.gen_index_str(),
        };
        output_base.join("Scenery").join(bucket.gen_base_path()).join(name)
    }

    /// Write the tile to `<output_base>/Scenery/<base_path>/<index>`,
    /// creating directories as needed. The tile is built in a temporary file
    /// next to the target and moved into place only once complete.
    pub fn write(&self, bucket: &Bucket, output_base: &Path) -> Result<PathBuf> {
        let path = self.tile_path(bucket, output_base);
        let dir = path.parent().unwrap_or(Path::new("."));
        ensure_dir_exists(dir)?;
        log::info!("  output file = {}", path.display());

        let tmp = NamedTempFile::new_in(dir).map_err(|e| ConstructError::io(dir, e))?;
        let file = tmp.as_file().try_clone().map_err(|e| ConstructError::io(tmp.path(), e))?;
        let tris = self.write_body(TileWriter::new(file, self.gzip)).map_err(|e| ConstructError::io(&path, e))?;

        tmp.as_file().sync_all().ok();
        tmp.persist(&path).map_err(|e| ConstructError::io(&path, e.error))?;
        log::info!("  wrote {tris} triangles ({})", self.style);
        Ok(path)
    }

    /// Every section of the tile, in order. Returns the triangle count.
    fn write_body(&self, mut writer: TileWriter) -> io::Result<usize> {
        writer.write_header()?;
        writer.write_sphere("gbs", self.gbs_center(), self.gbs_radius())?;
        writeln!(writer)?;
        writer.write_vertices(self)?;
        writer.write_normals(self)?;
        let tris = match self.style {
            OutputStyle::Triangles => {
                writer.write_triangles(self)?;
                self.elements().len()
            }
            OutputStyle::Fans => {
                writer.write_tex_coords(self)?;
                writer.write_fans(self)?
            }
        };
        writer.finish()?;
        Ok(tris)
    }
}
