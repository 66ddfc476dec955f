use tribit::*;

fn main() {
    Solution::run(&Args::parse());
}
