use std::fmt::Display;
use std::path::Path;

/// Language of the title slide labels and progress messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl Locale {
    pub fn conversion_time_label(self) -> &'static str {
        match self {
            Locale::En => "Conversion time",
            Locale::Zh => "视频转换时间",
        }
    }

    pub fn source_file_label(self) -> &'static str {
        match self {
            Locale::En => "Source file",
            Locale::Zh => "源文件",
        }
    }

    pub fn initializing(self, input: &Path, output: &Path) -> String {
        match self {
            Locale::En => format!(
                "Initializing converter: {} -> {}",
                input.display(),
                output.display()
            ),
            Locale::Zh => format!(
                "初始化转换器: {} -> {}",
                input.display(),
                output.display()
            ),
        }
    }

    pub fn extraction_started(self) -> &'static str {
        match self {
            Locale::En => "Starting frame extraction...",
            Locale::Zh => "开始提取视频帧...",
        }
    }

    pub fn video_info(self, fps: f64, frame_count: u64, duration_secs: f64) -> String {
        match self {
            Locale::En => format!(
                "Video info - FPS: {fps:.2}, Total frames: {frame_count}, Duration: {duration_secs:.2}s"
            ),
            Locale::Zh => format!(
                "视频信息 - FPS: {fps:.2}, 总帧数: {frame_count}, 时长: {duration_secs:.2}秒"
            ),
        }
    }

    pub fn frames_extracted(self, count: usize) -> String {
        match self {
            Locale::En => format!("Extracted {count} frames"),
            Locale::Zh => format!("已提取 {count} 帧"),
        }
    }

    pub fn extraction_finished(self, count: usize) -> String {
        match self {
            Locale::En => {
                format!("Frame extraction complete. Total frames extracted: {count}")
            }
            Locale::Zh => format!("完成帧提取，共提取 {count} 帧"),
        }
    }

    pub fn deck_started(self) -> &'static str {
        match self {
            Locale::En => "Starting PowerPoint generation...",
            Locale::Zh => "开始生成PowerPoint演示文稿...",
        }
    }

    pub fn slide_progress(self, index: usize, total: usize) -> String {
        match self {
            Locale::En => format!("Processing slide {index}/{total}..."),
            Locale::Zh => format!("处理第 {index}/{total} 张幻灯片..."),
        }
    }

    pub fn deck_saved(self, path: &Path) -> String {
        match self {
            Locale::En => format!("PowerPoint saved: {}", path.display()),
            Locale::Zh => format!("PowerPoint已保存: {}", path.display()),
        }
    }

    pub fn no_frames(self) -> &'static str {
        match self {
            Locale::En => "No frame data available, skipping deck generation",
            Locale::Zh => "没有可用的帧数据，跳过生成演示文稿",
        }
    }

    pub fn cleaned_up(self) -> &'static str {
        match self {
            Locale::En => "Temporary files cleaned up",
            Locale::Zh => "临时文件已清理",
        }
    }

    pub fn cleanup_failed(self, error: &dyn Display) -> String {
        match self {
            Locale::En => format!("Failed to clean up temporary files: {error}"),
            Locale::Zh => format!("清理临时文件失败: {error}"),
        }
    }

    pub fn completed(self) -> &'static str {
        match self {
            Locale::En => "Conversion completed successfully!",
            Locale::Zh => "转换完成！",
        }
    }

    pub fn failed(self, error: &dyn Display) -> String {
        match self {
            Locale::En => format!("Error during conversion: {error}"),
            Locale::Zh => format!("转换过程中出错: {error}"),
        }
    }
}
