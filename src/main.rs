fn main() {
    pomodoro_lib::run()
}
