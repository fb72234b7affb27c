fn main() {
    tile_crush::run();
}
