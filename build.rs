fn main() {
    slint_build::compile("ui/app-window.slint").expect("Slint UI 编译失败");
}
